//! Free-text classification of upstream failures.
//!
//! The upstream API reports failures only as text. Messages are matched
//! case-insensitively against fixed substring lists, checked in priority
//! order quota → invalid → disabled; anything unmatched is
//! [`FailureReason::Other`].

use crate::types::FailureReason;

const QUOTA_PATTERNS: &[&str] = &[
    "quota",
    "ratelimitexceeded",
    "rate limit",
    "dailylimitexceeded",
    "too many requests",
];

const INVALID_PATTERNS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "keyinvalid",
    "invalid api key",
    "api key expired",
];

const DISABLED_PATTERNS: &[&str] = &[
    "accessnotconfigured",
    "has not been used",
    "disabled",
    "api_key_service_blocked",
    "are blocked",
];

/// Classify an upstream error message.
pub fn classify(message: &str) -> FailureReason {
    let lowered = message.to_lowercase();
    let matches_any = |patterns: &[&str]| patterns.iter().any(|p| lowered.contains(p));

    if matches_any(QUOTA_PATTERNS) {
        FailureReason::Quota
    } else if matches_any(INVALID_PATTERNS) {
        FailureReason::Invalid
    } else if matches_any(DISABLED_PATTERNS) {
        FailureReason::Disabled
    } else {
        FailureReason::Other
    }
}
