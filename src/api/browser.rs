use super::Navigator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::info;
use url::Url;

/// Opens the system browser on the URL. The URL is printed as well so the
/// user can copy it when no browser comes up.
pub struct BrowserNavigator {}

impl BrowserNavigator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for BrowserNavigator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Navigator for BrowserNavigator {
    fn name(&self) -> &str {
        "browser"
    }

    async fn navigate(&self, url: &Url) -> Result<()> {
        println!(
            "Opening the following URL in your browser to authorize the application:\n\n{}\n",
            url
        );
        let target = url.to_string();
        tokio::task::spawn_blocking(move || open::that(&target))
            .await?
            .map_err(|e| anyhow!("failed to open browser: {}", e))?;
        info!("browser opened on authorization URL");
        Ok(())
    }
}

/// Prints the URL and leaves opening it to the user. For headless hosts.
pub struct PrintNavigator {}

impl PrintNavigator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for PrintNavigator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Navigator for PrintNavigator {
    fn name(&self) -> &str {
        "print"
    }

    async fn navigate(&self, url: &Url) -> Result<()> {
        println!(
            "Open this URL in your browser and authorize the application:\n\n{}\n",
            url
        );
        Ok(())
    }
}
