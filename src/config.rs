use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Shortest and longest verifier lengths RFC 7636 allows.
pub const MIN_VERIFIER_LENGTH: usize = 43;
pub const MAX_VERIFIER_LENGTH: usize = 128;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Spotify application client id. Required, but may come from SPOTIFY_CLIENT_ID.
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Space separated list of scopes, sent as-is.
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_verifier_length")]
    pub verifier_length: usize,
    /// A pending verifier older than this is treated as gone.
    #[serde(default = "default_verifier_max_age")]
    pub verifier_max_age_secs: u64,

    // path to the key/value store file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_redirect_uri() -> String { "http://localhost:5000/callback".into() }
fn default_scope() -> String { "user-read-private user-read-email".into() }
fn default_authorize_url() -> String { "https://accounts.spotify.com/authorize".into() }
fn default_verifier_length() -> usize { 64 }
fn default_verifier_max_age() -> u64 { 3600 }

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("spotify-pkce-login")
}
fn default_db_path() -> PathBuf { data_dir().join("store.db") }
fn default_log_dir() -> PathBuf { data_dir().join("logs") }

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
            authorize_url: default_authorize_url(),
            verifier_length: default_verifier_length(),
            verifier_max_age_secs: default_verifier_max_age(),
            db_path: default_db_path(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Read the file (when given) or start from defaults, then apply
    /// SPOTIFY_* environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Overwrite fields from a variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("SPOTIFY_CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = get("SPOTIFY_REDIRECT_URI") {
            self.redirect_uri = v;
        }
        if let Some(v) = get("SPOTIFY_SCOPE") {
            self.scope = v;
        }
        if let Some(v) = get("SPOTIFY_AUTH_URL") {
            self.authorize_url = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(anyhow!("client_id is not set (config file or SPOTIFY_CLIENT_ID)"));
        }
        Url::parse(&self.redirect_uri)
            .map_err(|e| anyhow!("invalid redirect_uri {:?}: {}", self.redirect_uri, e))?;
        Url::parse(&self.authorize_url)
            .map_err(|e| anyhow!("invalid authorize_url {:?}: {}", self.authorize_url, e))?;
        if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&self.verifier_length) {
            return Err(anyhow!(
                "verifier_length must be between {} and {}, got {}",
                MIN_VERIFIER_LENGTH,
                MAX_VERIFIER_LENGTH,
                self.verifier_length
            ));
        }
        if self.verifier_max_age_secs == 0 {
            return Err(anyhow!("verifier_max_age_secs must be greater than 0"));
        }
        Ok(())
    }
}
