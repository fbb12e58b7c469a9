//! Tool backend: `POST /tools/{operation}`.
//!
//! Each operation takes a small JSON body and answers with JSON built from
//! the intel services. Team names are free text and go through the alias
//! table before any lookup.

use crate::api::{parse_json_body, parse_request, ApiError};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Json, Path},
};
use chrono::Utc;
use scout_intel::report::{DEFAULT_DAYS_BACK, DEFAULT_MAX_NEWS, DEFAULT_MAX_VIDEOS};
use scout_intel::{intelligence_summary, matchup_summary};
use scout_types::{
    GameInfo, MatchupReport, NewsArticle, TeamComparison, TeamIntelligence, TeamStats,
    ToolOperation, VideoItem,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::Arc;

/// Days searched ahead by `next_game` when the caller does not say.
pub const DEFAULT_SEARCH_DAYS: i64 = 14;

/// Longest news look-back window, in days.
pub const MAX_DAYS_BACK: u32 = 365;

/// Longest `next_game` look-ahead window, in days.
pub const MAX_SEARCH_DAYS: i64 = 365;

/// Most articles one call may ask for (one NewsAPI page).
pub const MAX_NEWS_RESULTS: u32 = 100;

/// Most videos one call may ask for.
pub const MAX_VIDEO_RESULTS: usize = 50;

fn default_days_back() -> u32 {
    DEFAULT_DAYS_BACK
}

fn default_max_news() -> u32 {
    DEFAULT_MAX_NEWS
}

fn default_max_videos() -> usize {
    DEFAULT_MAX_VIDEOS
}

fn default_search_days() -> i64 {
    DEFAULT_SEARCH_DAYS
}

#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    pub query: String,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    #[serde(default = "default_max_news")]
    pub max_results: u32,
}

#[derive(Debug, Deserialize)]
pub struct VideosRequest {
    pub query: String,
    #[serde(default = "default_max_videos")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize)]
pub struct TeamIntelRequest {
    pub team: String,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    #[serde(default = "default_max_news")]
    pub max_news: u32,
    #[serde(default = "default_max_videos")]
    pub max_videos: usize,
}

#[derive(Debug, Deserialize)]
pub struct MatchupRequest {
    pub team1: String,
    pub team2: String,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
}

#[derive(Debug, Deserialize)]
pub struct NextGameRequest {
    pub team: String,
    #[serde(default = "default_search_days")]
    pub search_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct TeamStatsRequest {
    pub team: String,
    #[serde(default)]
    pub season: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CompareTeamsRequest {
    pub team1: String,
    pub team2: String,
    #[serde(default)]
    pub season: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticlesResponse {
    pub articles: Vec<NewsArticle>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideosResponse {
    pub videos: Vec<VideoItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextGameResponse {
    pub team_id: i64,
    pub team_name: String,
    pub game: Option<GameInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamStatsResponse {
    pub team_id: i64,
    pub team_name: String,
    pub stats: TeamStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompareTeamsResponse {
    /// Resolved club names, in request order.
    pub teams: [String; 2],
    pub comparison: TeamComparison,
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Rejects numeric fields outside `min..=max` with a 400 naming the field.
fn require_range<T: PartialOrd + Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ApiError> {
    if value < min || value > max {
        return Err(ApiError::BadRequest(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::InternalServerError(e.to_string()))
}

/// Handler for `POST /tools/{operation}`.
pub async fn tool_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(operation): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let operation: ToolOperation = operation
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown tool: {operation}")))?;
    tracing::info!(%operation, "tool call");

    let response = match operation {
        ToolOperation::Echo => {
            let received = parse_json_body(&body)?;
            json!({ "received": received })
        }
        ToolOperation::News => news(&state, parse_request(&body)?).await?,
        ToolOperation::Videos => videos(&state, parse_request(&body)?).await?,
        ToolOperation::TeamIntel => team_intel(&state, parse_request(&body)?).await?,
        ToolOperation::Matchup => matchup(&state, parse_request(&body)?).await?,
        ToolOperation::NextGame => next_game(&state, parse_request(&body)?).await?,
        ToolOperation::TeamStats => team_stats(&state, parse_request(&body)?).await?,
        ToolOperation::CompareTeams => compare_teams(&state, parse_request(&body)?).await?,
    };
    Ok(Json(response))
}

async fn news(state: &AppState, req: NewsRequest) -> Result<Value, ApiError> {
    require_text("query", &req.query)?;
    require_range("days_back", req.days_back, 0, MAX_DAYS_BACK)?;
    require_range("max_results", req.max_results, 1, MAX_NEWS_RESULTS)?;
    let articles = state
        .intel
        .news()
        .search(&req.query, req.days_back, req.max_results)
        .await?;
    to_json(&ArticlesResponse { articles })
}

async fn videos(state: &AppState, req: VideosRequest) -> Result<Value, ApiError> {
    require_text("query", &req.query)?;
    require_range("max_results", req.max_results, 1, MAX_VIDEO_RESULTS)?;
    let videos = state
        .intel
        .youtube()
        .search_videos(&req.query, req.max_results)
        .await?;
    to_json(&VideosResponse { videos })
}

async fn team_intel(state: &AppState, req: TeamIntelRequest) -> Result<Value, ApiError> {
    require_text("team", &req.team)?;
    require_range("days_back", req.days_back, 0, MAX_DAYS_BACK)?;
    require_range("max_news", req.max_news, 1, MAX_NEWS_RESULTS)?;
    require_range("max_videos", req.max_videos, 1, MAX_VIDEO_RESULTS)?;
    let mut intel: TeamIntelligence = state
        .intel
        .team_intelligence(&req.team, req.days_back, req.max_news, req.max_videos)
        .await;
    intel.summary = Some(intelligence_summary(&intel));
    to_json(&intel)
}

async fn matchup(state: &AppState, req: MatchupRequest) -> Result<Value, ApiError> {
    require_text("team1", &req.team1)?;
    require_text("team2", &req.team2)?;
    require_range("days_back", req.days_back, 0, MAX_DAYS_BACK)?;
    let mut report: MatchupReport = state
        .intel
        .matchup(&req.team1, &req.team2, req.days_back)
        .await;
    report.summary = Some(matchup_summary(&report));
    to_json(&report)
}

async fn next_game(state: &AppState, req: NextGameRequest) -> Result<Value, ApiError> {
    require_text("team", &req.team)?;
    require_range("search_days", req.search_days, 1, MAX_SEARCH_DAYS)?;
    let (team_id, team_name) = state.mlb.require_team(&req.team).await?;
    let game = state
        .mlb
        .next_game(team_id, Utc::now(), req.search_days)
        .await?;
    to_json(&NextGameResponse {
        team_id,
        team_name,
        game,
    })
}

async fn team_stats(state: &AppState, req: TeamStatsRequest) -> Result<Value, ApiError> {
    require_text("team", &req.team)?;
    let (team_id, team_name) = state.mlb.require_team(&req.team).await?;
    let stats = state.mlb.team_stats(team_id, req.season).await;
    to_json(&TeamStatsResponse {
        team_id,
        team_name,
        stats,
    })
}

async fn compare_teams(state: &AppState, req: CompareTeamsRequest) -> Result<Value, ApiError> {
    require_text("team1", &req.team1)?;
    require_text("team2", &req.team2)?;
    let (id1, name1) = state.mlb.require_team(&req.team1).await?;
    let (id2, name2) = state.mlb.require_team(&req.team2).await?;
    let comparison = state.mlb.compare_teams(id1, id2, req.season).await;
    to_json(&CompareTeamsResponse {
        teams: [name1, name2],
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let req: TeamIntelRequest = serde_json::from_value(json!({ "team": "Cubs" })).unwrap();
        assert_eq!(req.days_back, 7);
        assert_eq!(req.max_news, 10);
        assert_eq!(req.max_videos, 10);

        let req: NextGameRequest = serde_json::from_value(json!({ "team": "Cubs" })).unwrap();
        assert_eq!(req.search_days, 14);

        let req: NewsRequest =
            serde_json::from_value(json!({ "query": "trade", "tool_token": "t" })).unwrap();
        assert_eq!(req.max_results, 10);
    }

    #[test]
    fn blank_text_rejected() {
        assert!(matches!(require_text("team", "  "), Err(ApiError::BadRequest(_))));
        assert!(require_text("team", "Cubs").is_ok());
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        assert!(require_range("days_back", 0, 0, MAX_DAYS_BACK).is_ok());
        assert!(require_range("days_back", MAX_DAYS_BACK, 0, MAX_DAYS_BACK).is_ok());
        assert!(require_range("search_days", 1, 1, MAX_SEARCH_DAYS).is_ok());

        match require_range("days_back", u32::MAX, 0, MAX_DAYS_BACK) {
            Err(ApiError::BadRequest(msg)) => {
                assert_eq!(msg, "days_back must be between 0 and 365")
            }
            other => panic!("expected 400, got {other:?}"),
        }
        assert!(matches!(
            require_range("search_days", i64::MAX, 1, MAX_SEARCH_DAYS),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            require_range("max_results", 0usize, 1, MAX_VIDEO_RESULTS),
            Err(ApiError::BadRequest(_))
        ));
    }
}
