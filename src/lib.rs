//! vidscout: multi-region video discovery over a rotating pool of API keys.
//!
//! This crate is the application layer around [`vidscout_search`]: TOML
//! configuration, key set ingestion, platform paths and logging. The search
//! engine itself lives in the `vidscout-search` workspace member.

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use vidscout_search;
