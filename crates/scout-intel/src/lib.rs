//! Sports-intelligence data services.
//!
//! Thin clients over three public APIs, plus the aggregation that turns
//! their results into team reports:
//!
//! | Module | Upstream |
//! |--------|----------|
//! | [`news`] | NewsAPI `/v2/everything` |
//! | [`youtube`] | YouTube Data API v3 `search` + `videos` |
//! | [`mlb`] | MLB Stats API `teams`, `schedule`, `teams/stats` |
//! | [`report`] | none; combines news and video into Markdown reports |
//!
//! Team names typed by users are normalised through the alias table in
//! [`aliases`] before any upstream is queried.
//!
//! Parsing is split from fetching: every client has a pure `parse_*`
//! function over `serde_json::Value` so upstream quirks are testable
//! without a network.

pub mod aliases;
pub mod config;
mod error;
pub mod mlb;
pub mod news;
pub mod report;
pub mod youtube;

pub use aliases::team_search_terms;
pub use config::IntelConfig;
pub use error::IntelError;
pub use mlb::MlbClient;
pub use news::NewsClient;
pub use report::{intelligence_summary, matchup_summary, IntelService};
pub use youtube::YoutubeClient;

use serde_json::Value;

/// Sends a request and decodes a JSON body, turning non-2xx statuses into
/// [`IntelError::Upstream`].
pub(crate) async fn fetch_json(req: reqwest::RequestBuilder) -> Result<Value, IntelError> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(IntelError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}

/// Joins a base URL and a path with exactly one `/`.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
