//! Integration tests for full search sessions.
//!
//! Every test drives `run_search` against scripted in-process collaborators
//! (no network calls). Wire-level behaviour of the real client is covered by
//! the application crate's contract tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vidscout_search::{
    run_search, summarize, ApiKey, EngineConfig, EnrichmentApi, EnrichmentProgress,
    FailureReason, KeyPool, ProgressCallback, RawResult, RegionTarget, SearchApi, SearchError,
    SearchRequest, SearchTask, UpstreamError, VideoDetails,
};

fn raw(id: &str, found_by: &str) -> RawResult {
    RawResult {
        id: id.to_string(),
        title: format!("Video {id}"),
        description: String::new(),
        channel_id: "UC123".to_string(),
        channel_title: "Channel".to_string(),
        published_at: None,
        thumbnail_url: None,
        found_by: found_by.to_string(),
    }
}

/// Search collaborator scripted per `(key index, task id)`.
#[derive(Default)]
struct ScriptedSearch {
    results: HashMap<String, Vec<String>>,
    failures: HashMap<(usize, String), String>,
    calls: Mutex<Vec<(usize, String)>>,
}

impl ScriptedSearch {
    fn returns(mut self, task: &str, ids: &[&str]) -> Self {
        self.results.insert(
            task.to_string(),
            ids.iter().map(|id| (*id).to_string()).collect(),
        );
        self
    }

    fn fails(mut self, key: usize, task: &str, message: &str) -> Self {
        self.failures
            .insert((key, task.to_string()), message.to_string());
        self
    }

    fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl SearchApi for ScriptedSearch {
    async fn search(
        &self,
        key: &ApiKey,
        task: &SearchTask,
        _max_results: usize,
    ) -> Result<Vec<RawResult>, UpstreamError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((key.index(), task.task_id.clone()));
        }
        if let Some(message) = self.failures.get(&(key.index(), task.task_id.clone())) {
            return Err(UpstreamError::new(message.clone()));
        }
        Ok(self
            .results
            .get(&task.task_id)
            .map(|ids| ids.iter().map(|id| raw(id, &task.task_id)).collect())
            .unwrap_or_default())
    }
}

/// Enrichment collaborator: echoes ids with a view count, or always fails.
#[derive(Default)]
struct ScriptedEnrichment {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedEnrichment {
    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl EnrichmentApi for ScriptedEnrichment {
    async fn enrich(
        &self,
        _key: &ApiKey,
        ids: &[String],
    ) -> Result<Vec<VideoDetails>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(UpstreamError::new(message.clone()));
        }
        Ok(ids
            .iter()
            .enumerate()
            .map(|(i, id)| VideoDetails {
                id: id.clone(),
                view_count: Some(100 + i as u64),
                ..Default::default()
            })
            .collect())
    }
}

fn regions(codes: &[&str]) -> SearchRequest {
    SearchRequest::by_regions("rust", 7, codes.iter().copied())
}

#[tokio::test]
async fn quota_on_first_key_rotates_and_completes() {
    let search = ScriptedSearch::default()
        .returns("US", &["a", "b"])
        .returns("JP", &["b", "c"])
        .fails(0, "US", "quotaExceeded: The request cannot be completed because you have exceeded your quota.")
        .fails(0, "JP", "quotaExceeded: The request cannot be completed because you have exceeded your quota.");
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["k1", "k2", "k3"]);

    let report = run_search(
        &regions(&["US", "JP"]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await
    .expect("session should run");

    let mut ids: Vec<&str> = report.results.iter().map(|r| r.result.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(report.ledger.len(), 1);
    assert_eq!(report.ledger.get(0), Some(FailureReason::Quota));
    assert!(!report.pool_exhausted);
    assert!(report.failure_summary.is_none());
    assert_eq!(summarize(&report.ledger).as_deref(), Some("Key 1 exceeded quota."));
    assert_eq!(report.rounds, 2);
}

#[tokio::test]
async fn single_invalid_key_exhausts_pool() {
    let search = ScriptedSearch::default()
        .returns("US", &["a"])
        .fails(0, "US", "badRequest: API key not valid. Please pass a valid API key.");
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["only"]);

    let report = run_search(
        &regions(&["US"]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await
    .expect("session should run");

    assert!(report.results.is_empty());
    assert!(report.pool_exhausted);
    assert_eq!(report.ledger.get(0), Some(FailureReason::Invalid));
    assert_eq!(report.failure_summary.as_deref(), Some("Key 1 is invalid."));
    assert_eq!(report.incomplete_tasks, vec!["US".to_string()]);
    assert_eq!(enrichment.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn enrichment_progress_reported_per_batch() {
    let ids: Vec<String> = (0..25).map(|i| format!("v{i:02}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let search = ScriptedSearch::default().returns("US", &id_refs);
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["k1"]);
    let config = EngineConfig {
        batch_size: 10,
        ..Default::default()
    };

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: ProgressCallback = Box::new(move |tick| {
        if let Ok(mut ticks) = sink.lock() {
            ticks.push(tick);
        }
    });

    let report = run_search(
        &regions(&["US"]),
        &mut pool,
        &search,
        &enrichment,
        &config,
        Some(&callback),
    )
    .await
    .expect("session should run");

    assert_eq!(report.results.len(), 25);
    assert_eq!(enrichment.calls.load(Ordering::SeqCst), 3);
    let expected: Vec<EnrichmentProgress> = (1..=3)
        .map(|current| EnrichmentProgress { current, total: 3 })
        .collect();
    assert_eq!(report.progress, expected);
    assert_eq!(seen.lock().map(|t| t.clone()).unwrap_or_default(), expected);
    assert!(report.results.iter().all(|r| r.details.is_some()));
    assert!(!report.degraded);
}

#[tokio::test]
async fn enrichment_failure_degrades_without_losing_results() {
    let search = ScriptedSearch::default()
        .returns("US", &["a", "b"])
        .returns("GB", &["b", "c"]);
    let enrichment = ScriptedEnrichment::failing("backendError: Backend Error");
    let mut pool = KeyPool::new(["k1", "k2"]);

    let report = run_search(
        &regions(&["US", "GB"]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await
    .expect("session should run");

    assert!(report.degraded);
    assert_eq!(report.results.len(), 3);
    assert!(report.results.iter().all(|r| r.details.is_none()));
    let a = report
        .results
        .iter()
        .find(|r| r.result.id == "a")
        .expect("a present");
    assert_eq!(a.result.title, "Video a");
    assert_eq!(a.result.found_by, "US");
    assert!(report.ledger.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].task_id, "enrichment");
}

#[tokio::test]
async fn enrichment_quota_exhausts_shared_pool() {
    let search = ScriptedSearch::default().returns("US", &["a"]);
    let enrichment = ScriptedEnrichment::failing("quotaExceeded: quota");
    let mut pool = KeyPool::new(["k1", "k2"]);

    let report = run_search(
        &regions(&["US"]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await
    .expect("session should run");

    assert_eq!(report.results.len(), 1);
    assert!(report.degraded);
    assert!(report.pool_exhausted);
    assert_eq!(report.ledger.len(), 2);
    assert_eq!(
        report.failure_summary.as_deref(),
        Some("Keys 1, 2 exceeded quota.")
    );
}

#[tokio::test]
async fn transient_search_failure_becomes_warning_without_rotation() {
    let search = ScriptedSearch::default()
        .returns("US", &["a", "b"])
        .returns("JP", &["c"])
        .fails(0, "JP", "HTTP 503: backend unavailable");
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["k1", "k2"]);

    let report = run_search(
        &regions(&["US", "JP"]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await
    .expect("session should run");

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].task_id, "JP");
    assert!(report.warnings[0].message.contains("503"));
    let mut ids: Vec<&str> = report.results.iter().map(|r| r.result.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(report.rounds, 1);
    assert!(report.ledger.is_empty());
    assert!(!report.pool_exhausted);
    assert!(report.failure_summary.is_none());
    assert!(report.incomplete_tasks.is_empty());
    assert!(search.calls().iter().all(|(key, _)| *key == 0));
    assert_eq!(search.calls().len(), 2);
}

#[tokio::test]
async fn oversized_day_range_fails_before_any_call() {
    let search = ScriptedSearch::default().returns("US", &["a"]);
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["k1"]);

    let result = run_search(
        &SearchRequest::by_regions("rust", u32::MAX, ["US"]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await;

    assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
    assert!(search.calls().is_empty());
}

#[tokio::test]
async fn succeeded_tasks_are_never_rerun() {
    let search = ScriptedSearch::default()
        .returns("US", &["a"])
        .returns("JP", &["b"])
        .returns("DE", &["c"])
        .fails(0, "JP", "accessNotConfigured: YouTube Data API v3 has not been used in project 1")
        .fails(1, "JP", "dailyLimitExceeded: Daily Limit Exceeded");
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["k1", "k2", "k3"]);

    let report = run_search(
        &regions(&["US", "JP", "DE"]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await
    .expect("session should run");

    let calls = search.calls();
    assert_eq!(calls.iter().filter(|(_, t)| t == "US").count(), 1);
    assert_eq!(calls.iter().filter(|(_, t)| t == "DE").count(), 1);
    assert_eq!(calls.iter().filter(|(_, t)| t == "JP").count(), 3);
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.ledger.get(0), Some(FailureReason::Disabled));
    assert_eq!(report.ledger.get(1), Some(FailureReason::Quota));
    assert_eq!(
        summarize(&report.ledger).as_deref(),
        Some("Key 2 exceeded quota.\nKey 1 is disabled.")
    );
}

#[tokio::test]
async fn channel_scope_takes_precedence_over_regions() {
    let search = ScriptedSearch::default().returns("UCabc", &["x"]);
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["k1"]);
    let mut request = SearchRequest::by_channels("", 3, ["UCabc"]);
    request.regions = vec![RegionTarget::new("US")];

    let report = run_search(
        &request,
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await
    .expect("session should run");

    assert_eq!(search.calls(), vec![(0, "UCabc".to_string())]);
    assert_eq!(report.results.len(), 1);
}

#[tokio::test]
async fn precondition_errors_make_no_calls() {
    let search = ScriptedSearch::default();
    let enrichment = ScriptedEnrichment::default();

    let mut empty = KeyPool::default();
    let result = run_search(
        &regions(&["US"]),
        &mut empty,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await;
    assert!(matches!(result, Err(SearchError::EmptyPool)));

    let mut pool = KeyPool::new(["k1"]);
    let result = run_search(
        &regions(&[]),
        &mut pool,
        &search,
        &enrichment,
        &EngineConfig::default(),
        None,
    )
    .await;
    assert!(matches!(result, Err(SearchError::InvalidRequest(_))));

    assert!(search.calls().is_empty());
    assert_eq!(enrichment.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pool_is_reset_between_sessions() {
    let search = ScriptedSearch::default()
        .returns("US", &["a"])
        .fails(0, "US", "quotaExceeded");
    let enrichment = ScriptedEnrichment::default();
    let mut pool = KeyPool::new(["k1", "k2"]);
    let config = EngineConfig::default();

    for _ in 0..2 {
        let report = run_search(&regions(&["US"]), &mut pool, &search, &enrichment, &config, None)
            .await
            .expect("session should run");
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.ledger.get(0), Some(FailureReason::Quota));
    }
    // Each session starts again from key 1.
    assert_eq!(search.calls().iter().filter(|(k, _)| *k == 0).count(), 2);
}
