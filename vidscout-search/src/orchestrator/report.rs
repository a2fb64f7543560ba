//! Human-readable summary of which keys failed and why.

use crate::key_pool::FailureLedger;
use crate::types::FailureReason;

/// Reasons reported, in output order.
const REPORTED: [FailureReason; 3] = [
    FailureReason::Quota,
    FailureReason::Invalid,
    FailureReason::Disabled,
];

/// Render `ledger` as one line per failure reason, e.g.
/// `Keys 1, 3 exceeded quota.` followed by `Key 2 is invalid.`
///
/// Positions are 1-based and ascending. Returns `None` for an empty ledger.
/// Output depends only on the ledger's contents, not insertion order.
pub fn summarize(ledger: &FailureLedger) -> Option<String> {
    let lines: Vec<String> = REPORTED
        .iter()
        .filter_map(|reason| {
            let positions: Vec<String> = ledger
                .iter()
                .filter(|(_, r)| r == reason)
                .map(|(index, _)| (index + 1).to_string())
                .collect();
            (!positions.is_empty()).then(|| line(*reason, &positions))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn line(reason: FailureReason, positions: &[String]) -> String {
    let plural = positions.len() > 1;
    let subject = if plural { "Keys" } else { "Key" };
    let predicate = match (reason, plural) {
        (FailureReason::Quota, _) => "exceeded quota",
        (FailureReason::Invalid, false) => "is invalid",
        (FailureReason::Invalid, true) => "are invalid",
        (FailureReason::Disabled, false) => "is disabled",
        (FailureReason::Disabled, true) => "are disabled",
        (FailureReason::Other, _) => "failed",
    };
    format!("{subject} {} {predicate}.", positions.join(", "))
}
