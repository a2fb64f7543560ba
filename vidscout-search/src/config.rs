//! Engine configuration with sensible defaults.
//!
//! [`EngineConfig`] controls enrichment batching, per-task result limits,
//! HTTP timeouts and final result ordering. The defaults match the
//! upstream Data API's per-call ceilings.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Upstream ceiling on ids per enrichment call and results per search page.
pub const UPSTREAM_MAX_BATCH: usize = 50;

/// How the final result list is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrder {
    /// Most viewed first, then newest.
    #[default]
    Views,
    /// Newest first.
    Newest,
}

/// Configuration for one search session.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ids per enrichment call. Must be within `1..=UPSTREAM_MAX_BATCH`.
    pub batch_size: usize,
    /// How many enrichment chunks may be in flight at once.
    pub enrichment_concurrency: usize,
    /// Results requested per search task. Must be within `1..=UPSTREAM_MAX_BATCH`.
    pub max_results_per_task: usize,
    /// Per-call HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Final ordering of the result list.
    pub order: ResultOrder,
    /// Custom User-Agent string. If `None`, a crate-versioned default is used.
    pub user_agent: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: UPSTREAM_MAX_BATCH,
            enrichment_concurrency: 2,
            max_results_per_task: UPSTREAM_MAX_BATCH,
            timeout_seconds: 10,
            order: ResultOrder::Views,
            user_agent: None,
        }
    }
}

impl EngineConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.batch_size == 0 || self.batch_size > UPSTREAM_MAX_BATCH {
            return Err(SearchError::Config(format!(
                "batch_size must be between 1 and {UPSTREAM_MAX_BATCH}"
            )));
        }
        if self.enrichment_concurrency == 0 {
            return Err(SearchError::Config(
                "enrichment_concurrency must be greater than 0".into(),
            ));
        }
        if self.max_results_per_task == 0 || self.max_results_per_task > UPSTREAM_MAX_BATCH {
            return Err(SearchError::Config(format!(
                "max_results_per_task must be between 1 and {UPSTREAM_MAX_BATCH}"
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
