//! Core types: credentials, search tasks, per-task outcomes and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading secret characters surfaced by [`ApiKey::masked`].
const MASK_PREFIX_LEN: usize = 4;

/// Lifecycle state of a single credential within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    /// Not yet used in this session.
    Untried,
    /// Currently (or most recently) used for a round.
    Active,
    /// Proven bad for the rest of the session.
    Exhausted,
}

/// Classified reason a call failed.
///
/// Variants are declared in classification priority order, so the derived
/// [`Ord`] puts the highest-priority reason first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Credential temporarily out of quota / rate limited.
    Quota,
    /// Credential malformed or revoked.
    Invalid,
    /// Credential's API access is not enabled.
    Disabled,
    /// Anything else, including transport errors.
    Other,
}

impl FailureReason {
    /// Whether this failure is attributable to the credential itself and
    /// therefore drives key rotation.
    pub fn is_credential(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::Invalid => "invalid",
            Self::Disabled => "disabled",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One caller-supplied credential with its per-session state.
///
/// `Debug` and `Display` only ever show the masked prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub(crate) index: usize,
    pub(crate) secret: String,
    pub(crate) status: KeyStatus,
    pub(crate) failure_reason: Option<FailureReason>,
}

impl ApiKey {
    pub(crate) fn new(index: usize, secret: String) -> Self {
        Self {
            index,
            secret,
            status: KeyStatus::Untried,
            failure_reason: None,
        }
    }

    /// Position in the pool (0-based, stable for the session).
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based position, as shown to users.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    /// The raw credential. Only upstream clients should read this.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure_reason
    }

    /// Short, log-safe rendering of the secret, e.g. `AIza…`.
    pub fn masked(&self) -> String {
        let prefix: String = self.secret.chars().take(MASK_PREFIX_LEN).collect();
        format!("{prefix}…")
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("index", &self.index)
            .field("secret", &self.masked())
            .field("status", &self.status)
            .field("failure_reason", &self.failure_reason)
            .finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key {} ({})", self.position(), self.masked())
    }
}

/// Whether a task searches within a region or within a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    ByRegion,
    ByChannel,
}

/// Lower bound on result publication time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub published_after: DateTime<Utc>,
}

/// One independent unit of search work.
///
/// `task_id` is the region code for [`SearchScope::ByRegion`] and the
/// channel id for [`SearchScope::ByChannel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTask {
    pub task_id: String,
    pub query: String,
    pub scope: SearchScope,
    pub time_window: TimeWindow,
}

/// A primary search hit, as returned by the upstream search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// Platform-native video id; the dedup identity.
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail_url: Option<String>,
    /// Id of the task that produced this hit.
    pub found_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Failed,
}

/// Result of running one task against one key.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub task_id: String,
    pub status: TaskStatus,
    /// Empty on failure.
    pub items: Vec<RawResult>,
    pub error_class: Option<FailureReason>,
    /// Upstream error text, kept for warnings.
    pub error_message: Option<String>,
}

impl TaskOutcome {
    pub fn success(task_id: impl Into<String>, items: Vec<RawResult>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Success,
            items,
            error_class: None,
            error_message: None,
        }
    }

    pub fn failure(
        task_id: impl Into<String>,
        class: FailureReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Failed,
            items: Vec::new(),
            error_class: Some(class),
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

/// Supplementary per-video data from the enrichment call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoDetails {
    pub id: String,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    /// ISO-8601 duration as reported upstream (e.g. `PT4M13S`).
    pub duration: Option<String>,
}

/// A deduplicated result plus whatever enrichment could be fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    #[serde(flatten)]
    pub result: RawResult,
    /// `None` when enrichment was unavailable for this item.
    pub details: Option<VideoDetails>,
}

impl EnrichedResult {
    /// Wrap a primary result without enrichment.
    pub fn passthrough(result: RawResult) -> Self {
        Self {
            result,
            details: None,
        }
    }

    /// Secondary identity: the enrichment's id when present, else the primary id.
    pub fn identity(&self) -> &str {
        self.details
            .as_ref()
            .map_or(self.result.id.as_str(), |d| d.id.as_str())
    }

    pub fn view_count(&self) -> u64 {
        self.details
            .as_ref()
            .and_then(|d| d.view_count)
            .unwrap_or(0)
    }
}

/// One enrichment progress tick: `current` of `total` chunks done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentProgress {
    pub current: usize,
    pub total: usize,
}

/// Callback type for receiving enrichment progress as it happens.
pub type ProgressCallback = Box<dyn Fn(EnrichmentProgress) + Send + Sync>;

/// A soft, non-credential failure attached to the final result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWarning {
    /// Task id, or `enrichment` for enrichment chunk failures.
    pub task_id: String,
    pub message: String,
}
