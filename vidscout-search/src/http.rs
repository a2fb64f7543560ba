//! Shared HTTP client for upstream API requests.

use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::SearchError;

/// User-Agent sent when the config does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("vidscout-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for upstream API calls.
///
/// The client has the per-call timeout from config, gzip decompression and
/// either the configured or the crate-versioned User-Agent.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &EngineConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .gzip(true)
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}
