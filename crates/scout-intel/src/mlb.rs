//! MLB Stats API client.
//!
//! Resolves free-text team names to club ids, reads schedules, and gathers
//! season team statistics. The active-club list is fetched once and cached
//! for the lifetime of the client.

use crate::aliases::team_search_terms;
use crate::{fetch_json, join_url, IntelError};
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use scout_types::{GameInfo, HittingComparison, PitchingComparison, TeamComparison, TeamStats};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

/// MLB's sport id in the Stats API.
const SPORT_ID: &str = "1";

/// Name fields checked, in order, when matching a club against a search term.
const NAME_FIELDS: [&str; 7] = [
    "name",
    "teamName",
    "shortName",
    "clubName",
    "locationName",
    "fileCode",
    "teamCode",
];

#[derive(Debug)]
pub struct MlbClient {
    http: reqwest::Client,
    base_url: String,
    teams: OnceCell<Vec<Value>>,
}

impl MlbClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            teams: OnceCell::new(),
        }
    }

    /// Active MLB clubs. Fetched on first use; a failed fetch is retried on
    /// the next call.
    pub async fn teams(&self) -> Result<&[Value], IntelError> {
        let teams = self
            .teams
            .get_or_try_init(|| async {
                let body = fetch_json(
                    self.http
                        .get(join_url(&self.base_url, "/teams"))
                        .query(&[("sportId", SPORT_ID), ("activeStatus", "Yes")]),
                )
                .await?;
                let teams = body
                    .get("teams")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                tracing::info!(count = teams.len(), "loaded MLB team list");
                Ok::<_, IntelError>(teams)
            })
            .await?;
        Ok(teams.as_slice())
    }

    /// Resolves user input such as `"yanks"` or `"Boston"` to `(team_id, name)`.
    pub async fn resolve_team(&self, team_input: &str) -> Result<Option<(i64, String)>, IntelError> {
        let teams = self.teams().await?;
        Ok(match_team(teams, &team_search_terms(team_input)))
    }

    /// Like [`resolve_team`](Self::resolve_team) but treats no match as an error.
    pub async fn require_team(&self, team_input: &str) -> Result<(i64, String), IntelError> {
        self.resolve_team(team_input)
            .await?
            .ok_or_else(|| IntelError::TeamNotFound(team_input.to_string()))
    }

    /// Games for `team_id` between `start` and `end` inclusive.
    pub async fn schedule(
        &self,
        team_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<GameInfo>, IntelError> {
        let team = team_id.to_string();
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        let body = fetch_json(
            self.http
                .get(join_url(&self.base_url, "/schedule"))
                .query(&[
                    ("teamId", team.as_str()),
                    ("sportId", SPORT_ID),
                    ("startDate", start.as_str()),
                    ("endDate", end.as_str()),
                ]),
        )
        .await?;
        Ok(parse_schedule(&body, team_id, Utc::now()))
    }

    /// The first unfinished game at or after `from` within `search_days`.
    pub async fn next_game(
        &self,
        team_id: i64,
        from: DateTime<Utc>,
        search_days: i64,
    ) -> Result<Option<GameInfo>, IntelError> {
        let start = from.date_naive();
        let end = window_end(start, search_days)?;
        let games = self.schedule(team_id, start, end).await?;
        Ok(pick_next_game(games, from))
    }

    /// Season hitting and pitching aggregates for a club.
    ///
    /// Tries the league-wide endpoint first, then the per-team endpoint,
    /// then a hydrated team lookup. Source failures are logged and skipped,
    /// so this never fails; an unknown team yields an empty record.
    pub async fn team_stats(&self, team_id: i64, season: Option<i32>) -> TeamStats {
        let season = season.unwrap_or_else(|| Utc::now().year());
        let season_str = season.to_string();
        let params = [
            ("group", "hitting"),
            ("group", "pitching"),
            ("stats", "season"),
            ("season", season_str.as_str()),
            ("sportId", SPORT_ID),
        ];
        let mut out = TeamStats::new(season);

        match fetch_json(
            self.http
                .get(join_url(&self.base_url, "/teams/stats"))
                .query(&params),
        )
        .await
        {
            Ok(body) => {
                merge_league_stats(&mut out, &body, team_id);
                if out.has_data() {
                    return out;
                }
            }
            Err(e) => tracing::debug!(team_id, error = %e, "/teams/stats primary fetch failed"),
        }

        match fetch_json(
            self.http
                .get(join_url(&self.base_url, &format!("/teams/{team_id}/stats")))
                .query(&params),
        )
        .await
        {
            Ok(body) => {
                merge_team_endpoint_stats(&mut out, &body);
                if out.has_data() {
                    return out;
                }
            }
            Err(e) => tracing::debug!(team_id, error = %e, "/teams/{{teamId}}/stats fallback failed"),
        }

        let team = team_id.to_string();
        match fetch_json(
            self.http
                .get(join_url(&self.base_url, "/teams"))
                .query(&[
                    ("teamId", team.as_str()),
                    ("season", season_str.as_str()),
                    ("sportId", SPORT_ID),
                    ("hydrate", "teamStats(group=[hitting,pitching],type=[season])"),
                ]),
        )
        .await
        {
            Ok(body) => merge_hydrated_stats(&mut out, &body),
            Err(e) => tracing::debug!(team_id, error = %e, "hydrate fallback failed"),
        }

        out
    }

    /// Compares two clubs' season stats. Both lookups run concurrently.
    pub async fn compare_teams(
        &self,
        team1_id: i64,
        team2_id: i64,
        season: Option<i32>,
    ) -> TeamComparison {
        let (s1, s2) = tokio::join!(
            self.team_stats(team1_id, season),
            self.team_stats(team2_id, season)
        );
        compare(&s1, &s2)
    }
}

fn team_identity(team: &Value) -> Option<(i64, String)> {
    let id = team.get("id")?.as_i64()?;
    let name = team.get("name")?.as_str()?.to_string();
    Some((id, name))
}

/// Last day of a `search_days` window starting on `start`.
pub fn window_end(start: NaiveDate, search_days: i64) -> Result<NaiveDate, IntelError> {
    u64::try_from(search_days)
        .ok()
        .and_then(|days| start.checked_add_days(Days::new(days)))
        .ok_or_else(|| IntelError::InvalidRange(format!("search_days {search_days} is out of range")))
}

/// Finds the first club matching any candidate term.
///
/// Pass one checks each club's name fields for a substring match with each
/// candidate (lowercased). Pass two falls back to every string field of the
/// club joined by spaces.
pub fn match_team(teams: &[Value], candidates: &[String]) -> Option<(i64, String)> {
    let candidates: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();

    for team in teams {
        let names: Vec<String> = NAME_FIELDS
            .iter()
            .filter_map(|field| team.get(*field).and_then(Value::as_str))
            .map(str::to_lowercase)
            .collect();
        let hit = candidates
            .iter()
            .any(|c| names.iter().any(|n| n.contains(c.as_str())));
        if hit {
            if let Some(identity) = team_identity(team) {
                return Some(identity);
            }
        }
    }

    for team in teams {
        let Some(fields) = team.as_object() else {
            continue;
        };
        let combined = fields
            .values()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if candidates.iter().any(|c| combined.contains(c.as_str())) {
            if let Some(identity) = team_identity(team) {
                return Some(identity);
            }
        }
    }

    None
}

/// Extracts games from a `/schedule` response from `team_id`'s side.
///
/// Games without a pk, either team name, or an opponent are dropped, as are
/// games whose date cannot be parsed. A missing date is stamped with `now`.
pub fn parse_schedule(body: &Value, team_id: i64, now: DateTime<Utc>) -> Vec<GameInfo> {
    let mut games = Vec::new();
    let dates = body.get("dates").and_then(Value::as_array);

    for game in dates.into_iter().flatten().filter_map(|d| d.get("games")?.as_array()).flatten() {
        let Some(game_pk) = game.get("gamePk").and_then(Value::as_i64).filter(|pk| *pk != 0) else {
            continue;
        };
        let status = game.get("status");
        let status = status
            .and_then(|s| s.get("detailedState"))
            .and_then(Value::as_str)
            .or_else(|| {
                status
                    .and_then(|s| s.get("abstractGameState"))
                    .and_then(Value::as_str)
            })
            .unwrap_or_default()
            .to_string();

        let game_date = match game.get("gameDate").and_then(Value::as_str) {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(game_pk, game_date = raw, error = %e, "skipping game with bad date");
                    continue;
                }
            },
            None => now,
        };

        let side = |which: &str| game.get("teams").and_then(|t| t.get(which)).and_then(|s| s.get("team"));
        let home = side("home");
        let away = side("away");
        let home_name = home.and_then(|t| t.get("name")).and_then(Value::as_str);
        let away_name = away.and_then(|t| t.get("name")).and_then(Value::as_str);
        let is_home = home.and_then(|t| t.get("id")).and_then(Value::as_i64) == Some(team_id);

        let (Some(home_name), Some(away_name)) = (home_name, away_name) else {
            continue;
        };
        if home_name.is_empty() || away_name.is_empty() {
            continue;
        }
        let opponent = if is_home { away_name } else { home_name };

        games.push(GameInfo {
            game_pk,
            game_date,
            home_team: home_name.to_string(),
            away_team: away_name.to_string(),
            is_home,
            opponent: opponent.to_string(),
            venue: game
                .get("venue")
                .and_then(|v| v.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            status,
        });
    }

    games
}

/// Sorts `games` by date and returns the first unfinished one at or after
/// `from`.
pub fn pick_next_game(mut games: Vec<GameInfo>, from: DateTime<Utc>) -> Option<GameInfo> {
    games.sort_by_key(|g| g.game_date);
    games
        .into_iter()
        .find(|g| g.game_date >= from && !g.is_finished())
}

fn group_name(value: &Value) -> Option<&str> {
    value
        .get("group")
        .and_then(|g| g.get("displayName"))
        .and_then(Value::as_str)
        .filter(|g| !g.is_empty())
}

fn stat_block(split: &Value) -> Option<&Map<String, Value>> {
    split
        .get("stat")
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
}

fn stat_groups(body: &Value) -> &[Value] {
    body.get("stats")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn splits(value: &Value) -> &[Value] {
    value
        .get("splits")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// League-wide `/teams/stats`: each group lists every club; keep ours.
pub fn merge_league_stats(out: &mut TeamStats, body: &Value, team_id: i64) {
    for group in stat_groups(body) {
        let Some(name) = group_name(group) else {
            continue;
        };
        let ours = splits(group).iter().find(|sp| {
            sp.get("team").and_then(|t| t.get("id")).and_then(Value::as_i64) == Some(team_id)
        });
        if let Some(block) = ours.and_then(stat_block) {
            out.set_group(name, block.clone());
        }
    }
}

/// Per-team `/teams/{id}/stats`: the first non-empty split of each group.
pub fn merge_team_endpoint_stats(out: &mut TeamStats, body: &Value) {
    for group in stat_groups(body) {
        let Some(name) = group_name(group) else {
            continue;
        };
        let totals = splits(group)
            .iter()
            .find_map(stat_block)
            .cloned()
            .unwrap_or_default();
        out.set_group(name, totals);
    }
}

/// Hydrated `/teams?hydrate=teamStats(...)`: the group name may sit on the
/// stat entry or on each split.
pub fn merge_hydrated_stats(out: &mut TeamStats, body: &Value) {
    let Some(team) = body
        .get("teams")
        .and_then(Value::as_array)
        .and_then(|teams| teams.first())
    else {
        return;
    };
    let entries = team
        .get("teamStats")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for entry in entries {
        let entry_group = group_name(entry);
        for split in splits(entry) {
            let group = entry_group.or_else(|| group_name(split));
            if let (Some(group), Some(block)) = (group, stat_block(split)) {
                out.set_group(group, block.clone());
            }
        }
    }
}

/// Builds the side-by-side comparison from two stat records.
pub fn compare(s1: &TeamStats, s2: &TeamStats) -> TeamComparison {
    let hit = |key: &str| {
        [
            TeamStats::stat(s1.hitting.as_ref(), key),
            TeamStats::stat(s2.hitting.as_ref(), key),
        ]
    };
    let pitch = |key: &str| {
        [
            TeamStats::stat(s1.pitching.as_ref(), key),
            TeamStats::stat(s2.pitching.as_ref(), key),
        ]
    };

    TeamComparison {
        season: s1.season,
        hitting: HittingComparison {
            avg: hit("avg"),
            obp: hit("obp"),
            slg: hit("slg"),
            runs: hit("runs"),
            home_runs: hit("homeRuns"),
        },
        pitching: PitchingComparison {
            era: pitch("era"),
            whip: pitch("whip"),
            strikeouts: pitch("strikeOuts"),
        },
    }
}
