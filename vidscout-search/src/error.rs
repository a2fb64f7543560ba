//! Error types for the vidscout-search crate.
//!
//! Display strings are stable and never contain credential material.

/// Errors that abort a search before or outside the round loop.
///
/// Per-task upstream failures are not errors at this level: they are
/// classified and folded into the [`crate::SearchReport`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No credentials were configured.
    #[error("no API keys configured")]
    EmptyPool,

    /// The request could not be expanded into at least one task.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(String),
}

/// Convenience type alias for vidscout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Failure reported by an upstream collaborator.
///
/// The upstream API offers no structured error code, so the free-text
/// `message` is the only failure signal; see [`crate::classify`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
