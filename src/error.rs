//! Error types for the vidscout application layer.

/// Top-level error type for configuration, credentials and search.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file could not be parsed or serialized.
    #[error("config error: {0}")]
    Config(String),

    /// Key set could not be loaded.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search engine error.
    #[error(transparent)]
    Search(#[from] vidscout_search::SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
