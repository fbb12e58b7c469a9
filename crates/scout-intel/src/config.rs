//! Upstream endpoints and credentials for the intel services.

use serde::Deserialize;
use std::fmt;

pub const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_MLB_BASE_URL: &str = "https://statsapi.mlb.com/api/v1";

fn default_news_base_url() -> String {
    DEFAULT_NEWS_BASE_URL.to_string()
}

fn default_youtube_base_url() -> String {
    DEFAULT_YOUTUBE_BASE_URL.to_string()
}

fn default_mlb_base_url() -> String {
    DEFAULT_MLB_BASE_URL.to_string()
}

/// Intel service configuration.
///
/// Missing API keys are not an error: the affected source logs a warning
/// and contributes nothing to reports.
#[derive(Clone, Deserialize)]
pub struct IntelConfig {
    #[serde(default)]
    pub news_api_key: Option<String>,
    #[serde(default)]
    pub youtube_api_key: Option<String>,
    #[serde(default = "default_news_base_url")]
    pub news_base_url: String,
    #[serde(default = "default_youtube_base_url")]
    pub youtube_base_url: String,
    #[serde(default = "default_mlb_base_url")]
    pub mlb_base_url: String,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            youtube_api_key: None,
            news_base_url: default_news_base_url(),
            youtube_base_url: default_youtube_base_url(),
            mlb_base_url: default_mlb_base_url(),
        }
    }
}

impl fmt::Debug for IntelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("IntelConfig")
            .field("news_api_key", &redact(&self.news_api_key))
            .field("youtube_api_key", &redact(&self.youtube_api_key))
            .field("news_base_url", &self.news_base_url)
            .field("youtube_base_url", &self.youtube_base_url)
            .field("mlb_base_url", &self.mlb_base_url)
            .finish()
    }
}
