use super::pkce::PkcePair;
use super::Navigator;
use crate::config::Config;
use crate::store::KeyValueStore;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tracing::{debug, info};
use url::Url;

/// Storage key the pending code verifier lives under.
pub const CODE_VERIFIER_KEY: &str = "code_verifier";

/// This module starts the Spotify authorization-code + PKCE flow:
/// 1. Generate a random verifier and its S256 challenge.
/// 2. Store the verifier under `code_verifier`, replacing any older one.
/// 3. Build the authorize URL carrying the challenge.
/// 4. Hand the URL to the navigator (browser, stdout, ...).
///
/// The callback side (exchanging the returned code, which needs the stored
/// verifier) happens elsewhere; `take_verifier` is its way in.
pub async fn begin_authorization(
    cfg: &Config,
    store: &dyn KeyValueStore,
    navigator: &dyn Navigator,
) -> Result<Url> {
    let pair = PkcePair::generate(cfg.verifier_length).context("generating code verifier")?;
    debug!("generated code challenge {}", pair.challenge);

    store
        .set(CODE_VERIFIER_KEY, &pair.verifier)
        .await
        .context("storing code verifier")?;
    debug!("code verifier stored under {}", CODE_VERIFIER_KEY);

    let url = build_authorize_url(cfg, &pair.challenge)?;
    info!("redirecting to authorization endpoint via {} navigator", navigator.name());
    navigator
        .navigate(&url)
        .await
        .with_context(|| format!("navigating to authorization URL {}", url))?;
    Ok(url)
}

/// Query parameters of the authorization request, in the order they are sent.
pub fn authorize_params(cfg: &Config, challenge: &str) -> Vec<(&'static str, String)> {
    vec![
        ("response_type", "code".to_string()),
        ("client_id", cfg.client_id.clone()),
        ("scope", cfg.scope.clone()),
        ("code_challenge_method", "S256".to_string()),
        ("code_challenge", challenge.to_string()),
        ("redirect_uri", cfg.redirect_uri.clone()),
    ]
}

/// Authorization URL whose query is exactly `authorize_params`. Any query
/// already present on `authorize_url` is dropped.
pub fn build_authorize_url(cfg: &Config, challenge: &str) -> Result<Url> {
    let mut url = Url::parse(&cfg.authorize_url)
        .map_err(|e| anyhow!("invalid authorize_url {:?}: {}", cfg.authorize_url, e))?;
    if url.query().is_some() {
        debug!("dropping query already present on authorize_url");
        url.set_query(None);
    }
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in authorize_params(cfg, challenge) {
            pairs.append_pair(k, &v);
        }
    }
    Ok(url)
}

/// Read the pending verifier, leaving it in place. A verifier older than
/// `max_age_secs` is removed and reported as absent.
pub async fn stored_verifier(store: &dyn KeyValueStore, max_age_secs: u64) -> Result<Option<String>> {
    let entry = match store
        .entry(CODE_VERIFIER_KEY)
        .await
        .context("reading code verifier")?
    {
        Some(e) => e,
        None => return Ok(None),
    };
    let now = Utc::now().timestamp();
    if entry.is_older_than(max_age_secs, now) {
        info!(
            "pending code verifier expired ({}s old, limit {}s); discarding",
            entry.age_secs(now),
            max_age_secs
        );
        store
            .remove(CODE_VERIFIER_KEY)
            .await
            .context("removing expired code verifier")?;
        return Ok(None);
    }
    Ok(Some(entry.value))
}

/// Read and remove the pending verifier. A verifier is good for one exchange.
pub async fn take_verifier(store: &dyn KeyValueStore, max_age_secs: u64) -> Result<Option<String>> {
    let verifier = stored_verifier(store, max_age_secs).await?;
    if verifier.is_some() {
        store
            .remove(CODE_VERIFIER_KEY)
            .await
            .context("removing code verifier")?;
    }
    Ok(verifier)
}

/// Drop any pending verifier. Returns true if one was stored.
pub async fn discard_verifier(store: &dyn KeyValueStore) -> Result<bool> {
    let removed = store
        .remove(CODE_VERIFIER_KEY)
        .await
        .context("removing code verifier")?;
    if removed {
        info!("pending code verifier discarded");
    }
    Ok(removed)
}
