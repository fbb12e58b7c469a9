//! Sports-intelligence records.
//!
//! These are the shapes the intel services produce and the tool backend
//! serializes. Field names are `snake_case` on the wire except where the
//! MLB Stats API naming is kept for stat keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A news article returned by the news search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    /// Publisher name, `"Unknown"` when the upstream omits it.
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url_to_image: Option<String>,
}

/// A video returned by the video search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub channel: Option<String>,
    pub view_count: Option<u64>,
}

/// One scheduled or played game, seen from a specific team's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub game_pk: i64,
    pub game_date: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    /// Whether the team the schedule was requested for plays at home.
    pub is_home: bool,
    pub opponent: String,
    pub venue: Option<String>,
    /// Detailed game state, e.g. `"Scheduled"`, `"Final"`. Empty if unknown.
    pub status: String,
}

impl GameInfo {
    /// Returns `true` once the game can no longer be "next".
    pub fn is_finished(&self) -> bool {
        matches!(self.status.to_lowercase().as_str(), "final" | "game over")
    }
}

/// Aggregated news and video intelligence for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamIntelligence {
    pub team_name: String,
    pub news_articles: Vec<NewsArticle>,
    pub youtube_videos: Vec<VideoItem>,
    pub generated_at: DateTime<Utc>,
    /// Markdown report, filled in by the backend before responding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Two teams' intelligence gathered side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupReport {
    /// First team as the caller named it.
    pub team1: String,
    /// Second team as the caller named it.
    pub team2: String,
    pub first: TeamIntelligence,
    pub second: TeamIntelligence,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Season aggregates for one team, keyed by MLB Stats API stat names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub season: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hitting: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitching: Option<Map<String, Value>>,
}

impl TeamStats {
    /// Creates an empty record for the given season.
    pub fn new(season: i32) -> Self {
        Self {
            season,
            ..Self::default()
        }
    }

    /// Stores a stat block under its group display name (case-insensitive).
    ///
    /// Groups other than hitting and pitching are ignored.
    pub fn set_group(&mut self, group: &str, stats: Map<String, Value>) {
        match group.to_lowercase().as_str() {
            "hitting" => self.hitting = Some(stats),
            "pitching" => self.pitching = Some(stats),
            _ => {}
        }
    }

    /// Returns `true` if at least one group holds a non-empty stat block.
    pub fn has_data(&self) -> bool {
        self.hitting.as_ref().is_some_and(|m| !m.is_empty())
            || self.pitching.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Reads a stat as a float, accepting JSON numbers and numeric strings
    /// such as `".254"`.
    pub fn stat(group: Option<&Map<String, Value>>, key: &str) -> Option<f64> {
        match group?.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Hitting stats of two teams, `[first, second]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HittingComparison {
    pub avg: [Option<f64>; 2],
    pub obp: [Option<f64>; 2],
    pub slg: [Option<f64>; 2],
    pub runs: [Option<f64>; 2],
    #[serde(rename = "homeRuns")]
    pub home_runs: [Option<f64>; 2],
}

/// Pitching stats of two teams, `[first, second]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchingComparison {
    pub era: [Option<f64>; 2],
    pub whip: [Option<f64>; 2],
    pub strikeouts: [Option<f64>; 2],
}

/// Side-by-side season comparison of two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamComparison {
    pub season: i32,
    pub hitting: HittingComparison,
    pub pitching: PitchingComparison,
}
