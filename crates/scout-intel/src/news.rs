//! News search over NewsAPI.
//!
//! The query is used as-is; no sport-specific keywords are injected, so the
//! client works for any topic.

use crate::{fetch_json, join_url, IntelError};
use chrono::{DateTime, Days, NaiveDate, Utc};
use scout_types::NewsArticle;
use serde_json::Value;

/// NewsAPI caps `pageSize` at 100.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("NEWS_API_KEY not configured; news search will return no articles");
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

    /// Searches for articles about `topic` published in the last `days_back`
    /// days, newest first. `max_results == 0` yields no articles without a
    /// request.
    pub async fn search(
        &self,
        topic: &str,
        days_back: u32,
        max_results: u32,
    ) -> Result<Vec<NewsArticle>, IntelError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!(topic, "news client not initialized - missing API key");
            return Ok(Vec::new());
        };
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let to = now.date_naive();
        let from = window_start(to, days_back)?;
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let page_size = max_results.clamp(1, MAX_PAGE_SIZE).to_string();

        let body = fetch_json(
            self.http
                .get(join_url(&self.base_url, "/v2/everything"))
                .header("X-Api-Key", api_key)
                .query(&[
                    ("q", topic.trim()),
                    ("from", from.as_str()),
                    ("to", to.as_str()),
                    ("language", "en"),
                    ("sortBy", "publishedAt"),
                    ("pageSize", page_size.as_str()),
                ]),
        )
        .await?;

        let articles = parse_articles(&body, now);
        tracing::info!(count = articles.len(), topic, "found news articles");
        Ok(articles)
    }
}

/// First day of a `days_back` window ending on `to`.
pub fn window_start(to: NaiveDate, days_back: u32) -> Result<NaiveDate, IntelError> {
    to.checked_sub_days(Days::new(u64::from(days_back)))
        .ok_or_else(|| IntelError::InvalidRange(format!("days_back {days_back} is too large")))
}

/// Extracts articles from a NewsAPI response.
///
/// Responses whose `status` is not `"ok"` yield nothing. An article with an
/// unparseable `publishedAt` is skipped; one without a timestamp is stamped
/// with `now`.
pub fn parse_articles(body: &Value, now: DateTime<Utc>) -> Vec<NewsArticle> {
    if body.get("status").and_then(Value::as_str) != Some("ok") {
        return Vec::new();
    }

    let str_field = |article: &Value, key: &str| -> String {
        article
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    body.get("articles")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|article| {
            let published_at = match article.get("publishedAt").and_then(Value::as_str) {
                Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                    Ok(dt) => dt.with_timezone(&Utc),
                    Err(e) => {
                        tracing::warn!(published_at = raw, error = %e, "skipping article with bad timestamp");
                        return None;
                    }
                },
                None => now,
            };
            let source = article
                .get("source")
                .and_then(|s| s.get("name"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown")
                .to_string();

            Some(NewsArticle {
                title: str_field(article, "title"),
                description: str_field(article, "description"),
                url: str_field(article, "url"),
                source,
                published_at,
                url_to_image: article
                    .get("urlToImage")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}
