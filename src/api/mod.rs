pub mod pkce;
pub mod spotify_auth;
pub mod browser;
pub mod mock;

use anyhow::Result;
use url::Url;

/// Navigator trait: sends the user agent somewhere. The authorization flow
/// ends with exactly one call to `navigate`.
/// Implementations: browser::BrowserNavigator, browser::PrintNavigator, mock::MockNavigator.
#[async_trait::async_trait]
pub trait Navigator: Send + Sync {
    /// Send the user agent to url. Errors mean the navigation did not happen.
    async fn navigate(&self, url: &Url) -> Result<()>;

    /// Return the navigator's name (for logging)
    fn name(&self) -> &str;
}
