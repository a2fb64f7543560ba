//! YouTube Data API v3 client implementing both collaborator traits.
//!
//! - `search.list` for primary results (one call per task)
//! - `videos.list` for enrichment (up to 50 ids per call)
//!
//! Every failure is flattened to the free-text form the classifier expects:
//! `"<reason>: <message>"` from the JSON error body when there is one.
//! Request URLs carry the key as a query parameter, so transport errors are
//! stripped of their URL before being surfaced.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::api::{EnrichmentApi, SearchApi};
use crate::config::{EngineConfig, UPSTREAM_MAX_BATCH};
use crate::error::{SearchError, UpstreamError};
use crate::http::build_client;
use crate::types::{ApiKey, RawResult, SearchScope, SearchTask, VideoDetails};

/// Production endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Longest raw (non-JSON) error body quoted in an error message.
const MAX_RAW_ERROR_CHARS: usize = 200;

/// HTTP client for the Data API.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Create a client against the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &EngineConfig) -> Result<Self, SearchError> {
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            client: build_client(config)?,
        })
    }

    /// Point the client at a different endpoint root (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, UpstreamError> {
        Url::parse_with_params(&format!("{}/{path}", self.base_url), params)
            .map_err(|e| UpstreamError::new(format!("invalid endpoint URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::new(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::new(error_message(status.as_u16(), &body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::new(format!("failed to decode response: {}", e.without_url())))
    }
}

impl SearchApi for YouTubeClient {
    async fn search(
        &self,
        key: &ApiKey,
        task: &SearchTask,
        max_results: usize,
    ) -> Result<Vec<RawResult>, UpstreamError> {
        let mut params: Vec<(&str, String)> = vec![
            ("part", "snippet".into()),
            ("type", "video".into()),
            ("order", "date".into()),
            ("maxResults", max_results.min(UPSTREAM_MAX_BATCH).to_string()),
            (
                "publishedAfter",
                task.time_window
                    .published_after
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];
        if !task.query.is_empty() {
            params.push(("q", task.query.clone()));
        }
        match task.scope {
            SearchScope::ByRegion => params.push(("regionCode", task.task_id.clone())),
            SearchScope::ByChannel => params.push(("channelId", task.task_id.clone())),
        }
        params.push(("key", key.secret().to_owned()));

        tracing::trace!(task = %task.task_id, key = %key.masked(), "search.list");
        let url = self.endpoint("search", &params)?;
        let response: SearchListResponse = self.get_json(url).await?;
        Ok(response.into_results(&task.task_id))
    }
}

impl EnrichmentApi for YouTubeClient {
    async fn enrich(
        &self,
        key: &ApiKey,
        ids: &[String],
    ) -> Result<Vec<VideoDetails>, UpstreamError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = [
            ("part", "statistics,contentDetails".to_owned()),
            ("id", ids.join(",")),
            ("maxResults", ids.len().min(UPSTREAM_MAX_BATCH).to_string()),
            ("key", key.secret().to_owned()),
        ];

        tracing::trace!(ids = ids.len(), key = %key.masked(), "videos.list");
        let url = self.endpoint("videos", &params)?;
        let response: VideoListResponse = self.get_json(url).await?;
        Ok(response.items.into_iter().map(VideoItem::into_details).collect())
    }
}

/// Flatten an error response into `"<reason>: <message>"`.
fn error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    match parsed {
        Some(envelope) => {
            let detail = envelope.error;
            let reason = detail
                .errors
                .first()
                .and_then(|e| e.reason.clone())
                .or(detail.status);
            match reason {
                Some(reason) => format!("{reason}: {}", detail.message),
                None => format!("HTTP {status}: {}", detail.message),
            }
        }
        None => {
            let snippet: String = body.chars().take(MAX_RAW_ERROR_CHARS).collect();
            format!("HTTP {status}: {snippet}")
        }
    }
}

/// Undo the HTML escaping the API applies to titles and descriptions.
fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn parse_count(value: Option<String>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

impl SearchListResponse {
    fn into_results(self, task_id: &str) -> Vec<RawResult> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                let snippet = item.snippet.unwrap_or_default();
                let thumbnail_url = snippet.thumbnails.and_then(Thumbnails::best);
                Some(RawResult {
                    id,
                    title: decode_entities(&snippet.title),
                    description: decode_entities(&snippet.description),
                    channel_id: snippet.channel_id,
                    channel_title: decode_entities(&snippet.channel_title),
                    published_at: snippet.published_at,
                    thumbnail_url,
                    found_by: task_id.to_owned(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    published_at: Option<DateTime<Utc>>,
    channel_id: String,
    title: String,
    description: String,
    channel_title: String,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best(self) -> Option<String> {
        self.high.or(self.medium).or(self.default).map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    #[serde(default)]
    statistics: Option<Statistics>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

impl VideoItem {
    fn into_details(self) -> VideoDetails {
        let stats = self.statistics.unwrap_or_default();
        VideoDetails {
            id: self.id,
            view_count: parse_count(stats.view_count),
            like_count: parse_count(stats.like_count),
            comment_count: parse_count(stats.comment_count),
            duration: self.content_details.and_then(|c| c.duration),
        }
    }
}

/// Counts arrive as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDetails {
    duration: Option<String>,
}
