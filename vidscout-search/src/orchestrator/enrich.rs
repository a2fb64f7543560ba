//! Batched enrichment of deduplicated results.
//!
//! Items are split into consecutive chunks of at most `batch_size`; up to
//! `concurrency` chunks are in flight at a time, all on the current key.
//! Progress is reported once per finished chunk with a strictly increasing
//! counter. A chunk that cannot be enriched is passed through unchanged:
//! losing enrichment never loses a primary result.

use std::collections::HashMap;

use crate::api::EnrichmentApi;
use crate::classify::classify;
use crate::types::{
    EnrichedResult, EnrichmentProgress, FailureReason, RawResult, TaskWarning, VideoDetails,
};

use super::rotation::KeyRotation;

/// Task id used for warnings raised by enrichment chunks.
pub const ENRICHMENT_TASK_ID: &str = "enrichment";

/// What enrichment produced.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    /// One entry per input item, in input order.
    pub enriched: Vec<EnrichedResult>,
    /// Whether at least one chunk was passed through un-enriched.
    pub degraded: bool,
    /// Non-credential chunk failures.
    pub warnings: Vec<TaskWarning>,
    /// Number of chunks the input was split into.
    pub chunks: usize,
}

/// Fetches supplementary data in upstream-sized batches.
#[derive(Debug)]
pub struct EnrichmentBatcher<'a, E> {
    api: &'a E,
    batch_size: usize,
    concurrency: usize,
}

impl<'a, E: EnrichmentApi> EnrichmentBatcher<'a, E> {
    /// `batch_size` is capped at the API's own ceiling; both limits are at least 1.
    pub fn new(api: &'a E, batch_size: usize, concurrency: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, api.max_batch_size().max(1)),
            concurrency: concurrency.max(1),
            api,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Enrich `items`, calling `on_progress(current, total)` once per chunk.
    pub async fn enrich<F>(
        &self,
        items: Vec<RawResult>,
        keys: &mut KeyRotation<'_>,
        mut on_progress: F,
    ) -> EnrichmentOutcome
    where
        F: FnMut(EnrichmentProgress),
    {
        let chunks: Vec<Vec<RawResult>> = items
            .chunks(self.batch_size)
            .map(<[RawResult]>::to_vec)
            .collect();
        let total = chunks.len();
        let mut slots: Vec<Option<Vec<EnrichedResult>>> = vec![None; total];
        let mut outcome = EnrichmentOutcome {
            chunks: total,
            ..Default::default()
        };
        let mut completed = 0;
        let mut finish = |slot: &mut Option<Vec<EnrichedResult>>, value: Vec<EnrichedResult>| {
            *slot = Some(value);
            completed += 1;
            on_progress(EnrichmentProgress {
                current: completed,
                total,
            });
        };

        let mut pending: Vec<usize> = (0..total).collect();
        while !pending.is_empty() {
            let Some(key) = keys.current() else {
                tracing::warn!(
                    chunks = pending.len(),
                    "no usable API key left; passing results through un-enriched"
                );
                outcome.degraded = true;
                for index in pending.drain(..) {
                    finish(&mut slots[index], passthrough(&chunks[index]));
                }
                break;
            };

            let wave_len = pending.len().min(self.concurrency);
            let wave: Vec<usize> = pending.drain(..wave_len).collect();
            let key_ref = &key;
            let results = futures::future::join_all(wave.iter().map(|&index| {
                let ids: Vec<String> = chunks[index].iter().map(|r| r.id.clone()).collect();
                async move { (index, self.api.enrich(key_ref, &ids).await) }
            }))
            .await;

            let mut retry: Vec<usize> = Vec::new();
            let mut credential_failure: Option<FailureReason> = None;
            for (index, result) in results {
                match result {
                    Ok(details) => {
                        tracing::debug!(chunk = index + 1, total, "enrichment chunk done");
                        finish(&mut slots[index], attach(&chunks[index], details));
                    }
                    Err(err) => {
                        let class = classify(&err.message);
                        tracing::warn!(
                            chunk = index + 1,
                            key = %key.masked(),
                            reason = %class,
                            error = %err.message,
                            "enrichment chunk failed"
                        );
                        if class.is_credential() {
                            credential_failure =
                                Some(credential_failure.map_or(class, |c| c.min(class)));
                            retry.push(index);
                        } else {
                            outcome.degraded = true;
                            outcome.warnings.push(TaskWarning {
                                task_id: ENRICHMENT_TASK_ID.to_owned(),
                                message: err.message,
                            });
                            finish(&mut slots[index], passthrough(&chunks[index]));
                        }
                    }
                }
            }

            if let Some(reason) = credential_failure {
                keys.record_and_advance(key.index(), reason);
            }
            retry.append(&mut pending);
            pending = retry;
        }

        outcome.enriched = slots.into_iter().flatten().flatten().collect();
        outcome
    }
}

fn passthrough(chunk: &[RawResult]) -> Vec<EnrichedResult> {
    chunk.iter().cloned().map(EnrichedResult::passthrough).collect()
}

/// Pair each primary result with its details; ids missing upstream get none.
fn attach(chunk: &[RawResult], details: Vec<VideoDetails>) -> Vec<EnrichedResult> {
    let mut by_id: HashMap<String, VideoDetails> =
        details.into_iter().map(|d| (d.id.clone(), d)).collect();
    chunk
        .iter()
        .map(|raw| EnrichedResult {
            details: by_id.remove(&raw.id),
            result: raw.clone(),
        })
        .collect()
}
