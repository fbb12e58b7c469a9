//! Video search over the YouTube Data API v3.
//!
//! A search call finds recent uploads, then a `videos` call fetches their
//! statistics so results can be ranked by view count.

use crate::{fetch_json, join_url, IntelError};
use chrono::{Duration, Utc};
use scout_types::VideoItem;
use serde_json::Value;

/// Candidates requested from `search` before ranking.
const SEARCH_PAGE_SIZE: &str = "25";

/// The `videos` endpoint accepts at most 50 ids per call.
const VIDEOS_CHUNK_SIZE: usize = 50;

/// Only uploads from this many days back are considered.
const FRESHNESS_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct YoutubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl YoutubeClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("YOUTUBE_API_KEY not configured; video search will return no results");
        }
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Returns up to `max_results` recent videos for `query`, most viewed first.
    /// `max_results == 0` yields no videos without a request.
    pub async fn search_videos(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<VideoItem>, IntelError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let published_after = (Utc::now() - Duration::days(FRESHNESS_DAYS))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();

        let search = fetch_json(
            self.http
                .get(join_url(&self.base_url, "/search"))
                .query(&[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("maxResults", SEARCH_PAGE_SIZE),
                    ("order", "date"),
                    ("q", query),
                    ("key", api_key),
                    ("publishedAfter", published_after.as_str()),
                ]),
        )
        .await?;

        let ids = parse_search_ids(&search);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(VIDEOS_CHUNK_SIZE) {
            let joined = chunk.join(",");
            let details = fetch_json(
                self.http
                    .get(join_url(&self.base_url, "/videos"))
                    .query(&[
                        ("part", "snippet,statistics"),
                        ("id", joined.as_str()),
                        ("key", api_key),
                    ]),
            )
            .await?;
            videos.extend(parse_video_items(&details));
        }

        rank_by_views(&mut videos);
        videos.truncate(max_results);
        tracing::debug!(count = videos.len(), query, "video search complete");
        Ok(videos)
    }
}

/// Video ids from a `search` response, in response order.
pub fn parse_search_ids(body: &Value) -> Vec<String> {
    body.get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| item.get("id")?.get("videoId")?.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Videos from a `videos` response.
///
/// `viewCount` arrives as a decimal string; anything unparseable becomes
/// `None`.
pub fn parse_video_items(body: &Value) -> Vec<VideoItem> {
    body.get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| {
            let video_id = item.get("id")?.as_str()?.to_string();
            let snippet = item.get("snippet");
            let title = snippet
                .and_then(|s| s.get("title"))
                .and_then(Value::as_str)
                .unwrap_or("(untitled)")
                .to_string();
            let channel = snippet
                .and_then(|s| s.get("channelTitle"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let view_count = item
                .get("statistics")
                .and_then(|s| s.get("viewCount"))
                .and_then(|v| match v {
                    Value::String(s) => s.parse().ok(),
                    Value::Number(n) => n.as_u64(),
                    _ => None,
                });

            Some(VideoItem {
                url: format!("https://www.youtube.com/watch?v={video_id}"),
                video_id,
                title,
                channel,
                view_count,
            })
        })
        .collect()
}

/// Sorts by view count descending; videos without a count go last. Stable.
pub fn rank_by_views(videos: &mut [VideoItem]) {
    videos.sort_by(|a, b| b.view_count.cmp(&a.view_count));
}
