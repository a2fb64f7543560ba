//! Result deduplication.
//!
//! Primary results are collapsed by platform id across every successful
//! task; enriched results are collapsed once more by their secondary
//! identity. The first instance seen for an identity is kept and output
//! order follows first appearance. Which duplicate survives carries no
//! meaning; the set of ids does.

use std::collections::HashSet;

use crate::types::{EnrichedResult, RawResult, TaskOutcome};

/// Flatten the items of every successful outcome and drop repeated ids.
///
/// Guarantees `output.len() <= sum(outcome.items.len())` and unique ids.
pub fn merge(outcomes: Vec<TaskOutcome>) -> Vec<RawResult> {
    let items = outcomes
        .into_iter()
        .filter(TaskOutcome::is_success)
        .flat_map(|outcome| outcome.items);
    unique_by(items, |r| r.id.clone())
}

/// Drop enriched results whose secondary identity was already seen.
pub fn dedup_enriched(results: Vec<EnrichedResult>) -> Vec<EnrichedResult> {
    unique_by(results, |r| r.identity().to_owned())
}

fn unique_by<T>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FailureReason, VideoDetails};

    fn raw(id: &str, found_by: &str) -> RawResult {
        RawResult {
            id: id.into(),
            title: format!("Title {id}"),
            description: String::new(),
            channel_id: "UC1".into(),
            channel_title: "Channel".into(),
            published_at: None,
            thumbnail_url: None,
            found_by: found_by.into(),
        }
    }

    fn ids(results: &[RawResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn unique_ids_pass_through() {
        let outcomes = vec![
            TaskOutcome::success("US", vec![raw("a", "US"), raw("b", "US")]),
            TaskOutcome::success("JP", vec![raw("c", "JP")]),
        ];
        assert_eq!(ids(&merge(outcomes)), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicates_across_tasks_collapse_to_first_seen() {
        let outcomes = vec![
            TaskOutcome::success("US", vec![raw("a", "US"), raw("b", "US")]),
            TaskOutcome::success("GB", vec![raw("a", "GB"), raw("c", "GB")]),
        ];
        let merged = merge(outcomes);
        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged[0].found_by, "US");
    }

    #[test]
    fn failed_outcomes_contribute_nothing() {
        let mut failed = TaskOutcome::failure("JP", FailureReason::Other, "boom");
        failed.items.push(raw("x", "JP"));
        let outcomes = vec![TaskOutcome::success("US", vec![raw("a", "US")]), failed];
        assert_eq!(ids(&merge(outcomes)), vec!["a"]);
    }

    #[test]
    fn merge_is_idempotent_on_same_input() {
        let outcomes = vec![
            TaskOutcome::success("US", vec![raw("a", "US"), raw("a", "US"), raw("b", "US")]),
            TaskOutcome::success("GB", vec![raw("b", "GB"), raw("c", "GB")]),
        ];
        let total: usize = outcomes.iter().map(|o| o.items.len()).sum();
        let first = merge(outcomes.clone());
        let second = merge(outcomes);
        assert_eq!(ids(&first), ids(&second));
        assert!(first.len() <= total);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(merge(vec![]).is_empty());
        assert!(dedup_enriched(vec![]).is_empty());
    }

    #[test]
    fn enriched_dedup_uses_secondary_identity() {
        let mut first = EnrichedResult::passthrough(raw("a", "US"));
        first.details = Some(VideoDetails {
            id: "canonical".into(),
            ..Default::default()
        });
        let mut second = EnrichedResult::passthrough(raw("b", "US"));
        second.details = Some(VideoDetails {
            id: "canonical".into(),
            ..Default::default()
        });
        let third = EnrichedResult::passthrough(raw("c", "US"));

        let deduped = dedup_enriched(vec![first, second, third]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].result.id, "a");
        assert_eq!(deduped[1].result.id, "c");
    }
}
