//! One search session: rounds, merge, enrichment, ordering and reporting.

use serde::Serialize;
use tracing::Instrument;

use crate::api::{EnrichmentApi, SearchApi};
use crate::config::{EngineConfig, ResultOrder};
use crate::error::SearchError;
use crate::key_pool::{FailureLedger, KeyPool};
use crate::types::{EnrichedResult, EnrichmentProgress, ProgressCallback, SearchTask, TaskWarning};

use super::dedup::{dedup_enriched, merge};
use super::enrich::EnrichmentBatcher;
use super::report::summarize;
use super::rotation::KeyRotation;
use super::search::SearchOrchestrator;

/// Everything a session produced.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Identifier shared with the session's log span.
    pub session_id: String,
    /// Deduplicated results in the configured order.
    pub results: Vec<EnrichedResult>,
    /// Every progress tick emitted during enrichment, in order.
    pub progress: Vec<EnrichmentProgress>,
    /// Non-credential failures from search tasks and enrichment chunks.
    pub warnings: Vec<TaskWarning>,
    /// Tasks that never succeeded because no key remained.
    pub incomplete_tasks: Vec<String>,
    /// Credential failures observed this session, by key index.
    pub ledger: FailureLedger,
    /// Human-readable ledger summary; set only when the pool ran out.
    pub failure_summary: Option<String>,
    pub pool_exhausted: bool,
    /// Whether some results are missing enrichment.
    pub degraded: bool,
    /// Search rounds executed.
    pub rounds: usize,
}

impl SearchReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub(crate) struct OrchestratorSession<'a, S, E> {
    id: String,
    keys: KeyRotation<'a>,
    search_api: &'a S,
    enrich_api: &'a E,
    config: &'a EngineConfig,
}

impl<'a, S: SearchApi, E: EnrichmentApi> OrchestratorSession<'a, S, E> {
    /// Claim `pool` for a new session.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyPool`] if `pool` has no keys.
    pub(crate) fn begin(
        pool: &'a mut KeyPool,
        search_api: &'a S,
        enrich_api: &'a E,
        config: &'a EngineConfig,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            keys: KeyRotation::begin(pool)?,
            search_api,
            enrich_api,
            config,
        })
    }

    pub(crate) async fn run(
        mut self,
        tasks: Vec<SearchTask>,
        on_progress: Option<&ProgressCallback>,
    ) -> SearchReport {
        let span = tracing::info_span!("search_session", session = %self.id);
        async move {
            tracing::info!(tasks = tasks.len(), "search session started");

            let phase = SearchOrchestrator::new(self.search_api, self.config.max_results_per_task)
                .execute(tasks, &mut self.keys)
                .await;
            let merged = merge(phase.outcomes);
            tracing::debug!(count = merged.len(), "merged primary results");

            let mut progress = Vec::new();
            let batcher = EnrichmentBatcher::new(
                self.enrich_api,
                self.config.batch_size,
                self.config.enrichment_concurrency,
            );
            let enrichment = batcher
                .enrich(merged, &mut self.keys, |tick| {
                    progress.push(tick);
                    if let Some(callback) = on_progress {
                        callback(tick);
                    }
                })
                .await;

            let mut results = dedup_enriched(enrichment.enriched);
            sort_results(&mut results, self.config.order);

            let pool_exhausted = phase.pool_exhausted || self.keys.is_exhausted();
            let ledger = self.keys.into_ledger();
            let failure_summary = if pool_exhausted {
                summarize(&ledger)
            } else {
                None
            };
            let mut warnings = phase.warnings;
            warnings.extend(enrichment.warnings);

            tracing::info!(
                results = results.len(),
                rounds = phase.rounds,
                warnings = warnings.len(),
                pool_exhausted,
                degraded = enrichment.degraded,
                "search session finished"
            );

            SearchReport {
                session_id: self.id,
                results,
                progress,
                warnings,
                incomplete_tasks: phase.incomplete_tasks,
                ledger,
                failure_summary,
                pool_exhausted,
                degraded: enrichment.degraded,
                rounds: phase.rounds,
            }
        }
        .instrument(span)
        .await
    }
}

/// Order results in place. Ties fall back to newest first, then id.
pub fn sort_results(results: &mut [EnrichedResult], order: ResultOrder) {
    results.sort_by(|a, b| {
        let newest = b.result.published_at.cmp(&a.result.published_at);
        let by_id = a.result.id.cmp(&b.result.id);
        match order {
            ResultOrder::Views => b.view_count().cmp(&a.view_count()).then(newest).then(by_id),
            ResultOrder::Newest => newest.then(by_id),
        }
    });
}
