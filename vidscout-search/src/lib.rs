//! # vidscout-search
//!
//! Multi-region video search over a pool of interchangeable API keys.
//!
//! A [`SearchRequest`] is planned into one task per region (or per tracked
//! channel). Tasks run concurrently against the current key; when the
//! upstream rejects a key for quota, invalidity or a disabled service, the
//! key is recorded in a [`FailureLedger`] and only the failed tasks are
//! retried on the next key. Surviving results are merged, deduplicated,
//! enriched with statistics in batches, and ordered.
//!
//! ## Design
//!
//! - Upstream access sits behind the [`SearchApi`] and [`EnrichmentApi`]
//!   traits; [`YouTubeClient`] implements both
//! - Failure classification is free-text pattern matching ([`classify()`])
//! - Rotation is monotonic within a session: a failed key is never retried
//! - Enrichment failures degrade results, they never drop them
//!
//! ## Security
//!
//! - Key secrets never appear in `Debug`/`Display` output or logs; only a
//!   masked prefix is shown
//! - Transport errors are stripped of their request URL, which carries the key

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod key_pool;
pub mod orchestrator;
pub mod planner;
pub mod types;
pub mod youtube;

pub use api::{EnrichmentApi, SearchApi};
pub use classify::classify;
pub use config::{EngineConfig, ResultOrder};
pub use error::{Result, SearchError, UpstreamError};
pub use key_pool::{FailureLedger, KeyPool};
pub use orchestrator::{summarize, SearchReport};
pub use planner::{plan, RegionTarget, SearchRequest};
pub use types::{
    ApiKey, EnrichedResult, EnrichmentProgress, FailureReason, KeyStatus, ProgressCallback,
    RawResult, SearchScope, SearchTask, TaskWarning, VideoDetails,
};
pub use youtube::YouTubeClient;

use orchestrator::OrchestratorSession;

/// Run one search session.
///
/// The pool's failure state is reset first, so every key gets a fresh
/// chance each session. `on_progress` receives one tick per finished
/// enrichment batch; the same ticks are also collected in the report.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid `config`,
/// [`SearchError::InvalidRequest`] if the request yields no tasks, and
/// [`SearchError::EmptyPool`] if `pool` has no keys. All three are raised
/// before any upstream call. Upstream failures never surface here; they are
/// reported through the returned [`SearchReport`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> vidscout_search::Result<()> {
/// use vidscout_search::{EngineConfig, KeyPool, SearchRequest, YouTubeClient};
///
/// let config = EngineConfig::default();
/// let client = YouTubeClient::new(&config)?;
/// let mut pool = KeyPool::new(["AIza-first", "AIza-second"]);
/// let request = SearchRequest::by_regions("rust", 7, ["US"]);
/// let report = vidscout_search::run_search(&request, &mut pool, &client, &client, &config, None).await?;
/// for item in &report.results {
///     println!("{} ({} views)", item.result.title, item.view_count());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_search<S, E>(
    request: &SearchRequest,
    pool: &mut KeyPool,
    search_api: &S,
    enrich_api: &E,
    config: &EngineConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<SearchReport>
where
    S: SearchApi,
    E: EnrichmentApi,
{
    config.validate()?;
    let tasks = plan(request, chrono::Utc::now())?;
    let session = OrchestratorSession::begin(pool, search_api, enrich_api, config)?;
    Ok(session.run(tasks, on_progress).await)
}

/// Run a session against the production YouTube endpoint.
///
/// Convenience wrapper around [`run_search`] using a [`YouTubeClient`]
/// built from `config` for both search and enrichment.
///
/// # Errors
///
/// Same as [`run_search`], plus [`SearchError::Http`] if the HTTP client
/// cannot be built.
pub async fn run_youtube_search(
    request: &SearchRequest,
    pool: &mut KeyPool,
    config: &EngineConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<SearchReport> {
    config.validate()?;
    let client = YouTubeClient::new(config)?;
    run_search(request, pool, &client, &client, config, on_progress).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls; every call fails so a test reaching it would notice.
    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    impl SearchApi for CountingApi {
        async fn search(
            &self,
            _key: &ApiKey,
            _task: &SearchTask,
            _max_results: usize,
        ) -> std::result::Result<Vec<RawResult>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(UpstreamError::new("unexpected call"))
        }
    }

    impl EnrichmentApi for CountingApi {
        async fn enrich(
            &self,
            _key: &ApiKey,
            _ids: &[String],
        ) -> std::result::Result<Vec<VideoDetails>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(UpstreamError::new("unexpected call"))
        }
    }

    fn request() -> SearchRequest {
        SearchRequest::by_regions("rust", 7, ["US"])
    }

    #[tokio::test]
    async fn empty_pool_fails_before_any_call() {
        let api = CountingApi::default();
        let mut pool = KeyPool::default();
        let result = run_search(
            &request(),
            &mut pool,
            &api,
            &api,
            &EngineConfig::default(),
            None,
        )
        .await;
        assert!(matches!(result, Err(SearchError::EmptyPool)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_request_fails_before_any_call() {
        let api = CountingApi::default();
        let mut pool = KeyPool::new(["a"]);
        let empty = SearchRequest::by_regions("rust", 7, Vec::<String>::new());
        let result = run_search(&empty, &mut pool, &api, &api, &EngineConfig::default(), None).await;
        assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let api = CountingApi::default();
        let mut pool = KeyPool::new(["a"]);
        let config = EngineConfig {
            batch_size: 0,
            ..Default::default()
        };
        let result = run_search(&request(), &mut pool, &api, &api, &config, None).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("batch_size"));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn youtube_search_validates_config_first() {
        let mut pool = KeyPool::new(["a"]);
        let config = EngineConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = run_youtube_search(&request(), &mut pool, &config, None).await;
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }
}
