use super::Navigator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;
use url::Url;

/// A navigator used in tests: it logs and records every URL instead of
/// opening anything.
#[derive(Default)]
pub struct MockNavigator {
    visited: Mutex<Vec<Url>>,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs navigated to so far, oldest first.
    pub fn visited(&self) -> Result<Vec<Url>> {
        Ok(self.lock_visited()?.clone())
    }

    pub fn last_visited(&self) -> Result<Option<Url>> {
        Ok(self.lock_visited()?.last().cloned())
    }

    fn lock_visited(&self) -> Result<std::sync::MutexGuard<'_, Vec<Url>>> {
        self.visited
            .lock()
            .map_err(|_| anyhow!("mock navigator lock poisoned"))
    }
}

#[async_trait]
impl Navigator for MockNavigator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn navigate(&self, url: &Url) -> Result<()> {
        info!("MockNavigator: navigate {}", url);
        self.lock_visited()?.push(url.clone());
        Ok(())
    }
}
