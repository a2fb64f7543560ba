//! Trait definitions for the upstream collaborators.
//!
//! The orchestrator only ever talks to the platform through these two
//! seams, so any client (the bundled [`crate::youtube::YouTubeClient`], a
//! recorded fixture, a test double) can be plugged in.

use std::future::Future;

use crate::config::UPSTREAM_MAX_BATCH;
use crate::error::UpstreamError;
use crate::types::{ApiKey, RawResult, SearchTask, VideoDetails};

/// Primary search calls.
///
/// All implementations must be `Send + Sync`: one round issues every task's
/// call concurrently against the same client.
pub trait SearchApi: Send + Sync {
    /// Run one task with one key.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] carrying the upstream's free-text message.
    fn search(
        &self,
        key: &ApiKey,
        task: &SearchTask,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<RawResult>, UpstreamError>> + Send;
}

/// Secondary, batched per-item lookups.
pub trait EnrichmentApi: Send + Sync {
    /// Fetch details for at most [`EnrichmentApi::max_batch_size`] ids.
    ///
    /// Ids unknown upstream are simply absent from the returned list.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] carrying the upstream's free-text message.
    fn enrich(
        &self,
        key: &ApiKey,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<VideoDetails>, UpstreamError>> + Send;

    /// Largest batch the upstream accepts in one call.
    fn max_batch_size(&self) -> usize {
        UPSTREAM_MAX_BATCH
    }
}
