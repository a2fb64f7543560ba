//! Round loop: run every pending task concurrently against the current key,
//! classify failures, rotate on credential failures and retry only what
//! failed.
//!
//! # Round
//!
//! 1. Take the current key (stop if the pool is exhausted)
//! 2. Fan out all pending tasks with [`futures::future::join_all`]; one
//!    task's failure never cancels its siblings
//! 3. Keep every successful outcome; a succeeded task is never re-run
//! 4. If any task failed with a credential class, record the
//!    highest-priority such reason against the key, advance, and retry the
//!    tasks that failed this round on the next key
//! 5. Otherwise stop; `Other` failures become warnings and are not retried

use std::collections::BTreeMap;

use crate::api::SearchApi;
use crate::classify::classify;
use crate::types::{ApiKey, FailureReason, SearchTask, TaskOutcome, TaskWarning};

use super::rotation::KeyRotation;

/// What the round loop produced.
#[derive(Debug, Clone, Default)]
pub struct SearchPhase {
    /// One successful outcome per task that succeeded.
    pub outcomes: Vec<TaskOutcome>,
    /// Tasks whose final attempt failed with a non-credential error.
    pub warnings: Vec<TaskWarning>,
    /// Tasks that never succeeded because the pool ran out.
    pub incomplete_tasks: Vec<String>,
    /// Number of rounds executed.
    pub rounds: usize,
    /// Whether the loop stopped because no usable key remained.
    pub pool_exhausted: bool,
}

/// Executes task lists against a rotating key pool.
#[derive(Debug)]
pub struct SearchOrchestrator<'a, S> {
    api: &'a S,
    max_results_per_task: usize,
}

impl<'a, S: SearchApi> SearchOrchestrator<'a, S> {
    pub fn new(api: &'a S, max_results_per_task: usize) -> Self {
        Self {
            api,
            max_results_per_task,
        }
    }

    /// Run `tasks` to completion, success, or pool exhaustion.
    pub async fn execute(&self, tasks: Vec<SearchTask>, keys: &mut KeyRotation<'_>) -> SearchPhase {
        let mut phase = SearchPhase::default();
        let mut soft_failures: BTreeMap<String, String> = BTreeMap::new();
        let mut pending = tasks;

        while !pending.is_empty() {
            let Some(key) = keys.current() else {
                phase.pool_exhausted = true;
                break;
            };
            phase.rounds += 1;
            tracing::debug!(
                round = phase.rounds,
                key = %key.masked(),
                tasks = pending.len(),
                "starting search round"
            );

            let outcomes =
                futures::future::join_all(pending.iter().map(|task| self.run_task(&key, task))).await;

            let mut failed: Vec<SearchTask> = Vec::new();
            let mut credential_failure: Option<FailureReason> = None;

            for (task, outcome) in pending.into_iter().zip(outcomes) {
                if outcome.is_success() {
                    tracing::debug!(task = %task.task_id, count = outcome.items.len(), "task succeeded");
                    soft_failures.remove(&task.task_id);
                    phase.outcomes.push(outcome);
                    continue;
                }

                let class = outcome.error_class.unwrap_or(FailureReason::Other);
                let message = outcome.error_message.unwrap_or_default();
                tracing::warn!(
                    task = %task.task_id,
                    key = %key.masked(),
                    reason = %class,
                    error = %message,
                    "search task failed"
                );
                if class.is_credential() {
                    soft_failures.remove(&task.task_id);
                    credential_failure = Some(credential_failure.map_or(class, |c| c.min(class)));
                } else {
                    soft_failures.insert(task.task_id.clone(), message);
                }
                failed.push(task);
            }

            let Some(reason) = credential_failure else {
                break;
            };
            if keys.record_and_advance(key.index(), reason).is_none() {
                phase.pool_exhausted = true;
                phase.incomplete_tasks = failed.into_iter().map(|t| t.task_id).collect();
                break;
            }
            pending = failed;
        }

        phase.warnings = soft_failures
            .into_iter()
            .map(|(task_id, message)| TaskWarning { task_id, message })
            .collect();
        phase
    }

    async fn run_task(&self, key: &ApiKey, task: &SearchTask) -> TaskOutcome {
        match self.api.search(key, task, self.max_results_per_task).await {
            Ok(items) => TaskOutcome::success(task.task_id.as_str(), items),
            Err(err) => {
                let class = classify(&err.message);
                TaskOutcome::failure(task.task_id.as_str(), class, err.message)
            }
        }
    }
}
