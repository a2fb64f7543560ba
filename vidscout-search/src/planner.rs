//! Expands a search request into independent search tasks.
//!
//! Pure: no network access and no state. Tracked channels take precedence
//! over regions; otherwise one task is produced per selected region.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::{SearchScope, SearchTask, TimeWindow};

/// A region to search, with an optional keyword translated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTarget {
    /// Region code, e.g. `US`. Normalised to upper case.
    pub code: String,
    /// Keyword in the region's language; falls back to the request keyword.
    #[serde(default)]
    pub keyword: Option<String>,
}

impl RegionTarget {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            keyword: None,
        }
    }

    pub fn translated(code: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            keyword: Some(keyword.into()),
        }
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
    /// Only results published within this many days are returned.
    pub date_range_days: u32,
    #[serde(default)]
    pub regions: Vec<RegionTarget>,
    /// Channel ids; when non-empty, the search is channel-scoped.
    #[serde(default)]
    pub tracked_channels: Vec<String>,
}

impl SearchRequest {
    /// Region-scoped request with the same keyword in every region.
    pub fn by_regions<I, S>(keyword: impl Into<String>, date_range_days: u32, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keyword: keyword.into(),
            date_range_days,
            regions: regions.into_iter().map(RegionTarget::new).collect(),
            tracked_channels: Vec::new(),
        }
    }

    /// Channel-scoped request.
    pub fn by_channels<I, S>(keyword: impl Into<String>, date_range_days: u32, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keyword: keyword.into(),
            date_range_days,
            regions: Vec::new(),
            tracked_channels: channels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Build the task list for `request`, with the time window anchored at `now`.
///
/// Duplicate region codes or channel ids collapse into one task, so every
/// `task_id` in the output is unique.
///
/// # Errors
///
/// Returns [`SearchError::InvalidRequest`] if no task can be built, the
/// date range is zero or reaches past the representable timestamps, or a
/// region has no keyword to search for.
pub fn plan(request: &SearchRequest, now: DateTime<Utc>) -> Result<Vec<SearchTask>, SearchError> {
    if request.date_range_days == 0 {
        return Err(SearchError::InvalidRequest(
            "date range must be at least one day".into(),
        ));
    }
    let published_after = Duration::try_days(i64::from(request.date_range_days))
        .and_then(|range| now.checked_sub_signed(range))
        .ok_or_else(|| SearchError::InvalidRequest("date range too large".into()))?;
    let time_window = TimeWindow { published_after };
    let keyword = request.keyword.trim();

    let channels = unique_non_empty(request.tracked_channels.iter().map(|c| c.trim().to_owned()));
    if !channels.is_empty() {
        return Ok(channels
            .into_iter()
            .map(|channel_id| SearchTask {
                task_id: channel_id,
                query: keyword.to_owned(),
                scope: SearchScope::ByChannel,
                time_window,
            })
            .collect());
    }

    let mut tasks: Vec<SearchTask> = Vec::new();
    for region in &request.regions {
        let code = region.code.trim().to_uppercase();
        if code.is_empty() || tasks.iter().any(|t| t.task_id == code) {
            continue;
        }
        let query = region
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(keyword);
        if query.is_empty() {
            return Err(SearchError::InvalidRequest(format!(
                "missing keyword for region {code}"
            )));
        }
        tasks.push(SearchTask {
            task_id: code,
            query: query.to_owned(),
            scope: SearchScope::ByRegion,
            time_window,
        });
    }

    if tasks.is_empty() {
        return Err(SearchError::InvalidRequest(
            "no regions or tracked channels selected".into(),
        ));
    }
    Ok(tasks)
}

fn unique_non_empty(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
