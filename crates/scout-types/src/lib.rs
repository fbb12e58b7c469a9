//! Shared types for the Scout workspace.
//!
//! This crate holds the serde types that cross crate boundaries: the tool
//! operation names understood by both the gateway proxy and the tool
//! backend, and the sports-intelligence records produced by `scout-intel`
//! and returned by the backend's JSON API.
//!
//! Nothing here performs I/O.

pub mod intel;

pub use intel::{
    GameInfo, HittingComparison, MatchupReport, NewsArticle, PitchingComparison, TeamComparison,
    TeamIntelligence, TeamStats, VideoItem,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operations exposed by the tool backend under `/tools/{operation}`.
///
/// The gateway proxy only forwards operations that parse into this enum,
/// so an arbitrary path segment can never be spliced into the backend URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOperation {
    /// Returns the request payload unchanged.
    Echo,
    /// Recent news articles for a free-text query.
    News,
    /// Recent videos for a free-text query.
    Videos,
    /// Aggregated news + video report for one team.
    TeamIntel,
    /// Side-by-side report for two teams.
    Matchup,
    /// The next scheduled game for a team.
    NextGame,
    /// Season hitting and pitching aggregates for a team.
    TeamStats,
    /// Key season stats of two teams side by side.
    CompareTeams,
}

impl ToolOperation {
    /// Every operation, in routing order.
    pub const ALL: [ToolOperation; 8] = [
        Self::Echo,
        Self::News,
        Self::Videos,
        Self::TeamIntel,
        Self::Matchup,
        Self::NextGame,
        Self::TeamStats,
        Self::CompareTeams,
    ];

    /// Returns the path segment for this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::News => "news",
            Self::Videos => "videos",
            Self::TeamIntel => "team_intel",
            Self::Matchup => "matchup",
            Self::NextGame => "next_game",
            Self::TeamStats => "team_stats",
            Self::CompareTeams => "compare_teams",
        }
    }
}

impl std::fmt::Display for ToolOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolOperation {
    type Err = ParseToolOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseToolOperationError(s.to_string()))
    }
}

/// Error returned when parsing an unknown tool operation name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0}")]
pub struct ParseToolOperationError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_round_trip() {
        for op in ToolOperation::ALL {
            assert_eq!(op.as_str().parse::<ToolOperation>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = "../admin".parse::<ToolOperation>().unwrap_err();
        assert_eq!(err.to_string(), "unknown tool: ../admin");
        assert!("TeamIntel".parse::<ToolOperation>().is_err());
        assert!("".parse::<ToolOperation>().is_err());
    }

    #[test]
    fn serde_uses_path_names() {
        let json = serde_json::to_string(&ToolOperation::CompareTeams).unwrap();
        assert_eq!(json, "\"compare_teams\"");
    }
}
