//! Team intelligence reports.
//!
//! Combines news and video search into [`TeamIntelligence`] records and
//! renders them as Markdown for voice agents and humans alike.

use crate::aliases::team_search_terms;
use crate::news::NewsClient;
use crate::youtube::YoutubeClient;
use chrono::Utc;
use scout_types::{MatchupReport, TeamIntelligence};

/// Defaults used when a caller does not specify limits.
pub const DEFAULT_DAYS_BACK: u32 = 7;
pub const DEFAULT_MAX_NEWS: u32 = 10;
pub const DEFAULT_MAX_VIDEOS: usize = 10;

/// Items listed per section in the intelligence summary.
const SUMMARY_TOP_ITEMS: usize = 5;
/// Headlines listed per team in the matchup summary.
const MATCHUP_TOP_HEADLINES: usize = 3;
/// Characters of an article description kept in the summary.
const DESCRIPTION_PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone)]
pub struct IntelService {
    news: NewsClient,
    youtube: YoutubeClient,
}

impl IntelService {
    pub fn new(news: NewsClient, youtube: YoutubeClient) -> Self {
        Self { news, youtube }
    }

    pub fn news(&self) -> &NewsClient {
        &self.news
    }

    pub fn youtube(&self) -> &YoutubeClient {
        &self.youtube
    }

    /// Gathers recent news and videos for one team.
    ///
    /// The team name is normalised to its primary alias first. A failing
    /// source contributes an empty list rather than failing the report.
    pub async fn team_intelligence(
        &self,
        team_name: &str,
        days_back: u32,
        max_news: u32,
        max_videos: usize,
    ) -> TeamIntelligence {
        tracing::info!(team = team_name, "gathering intelligence");

        let primary = team_search_terms(team_name)
            .into_iter()
            .next()
            .unwrap_or_else(|| team_name.to_string());
        let video_query = format!("{primary} MLB baseball highlights analysis");

        let (news, videos) = tokio::join!(
            self.news.search(&primary, days_back, max_news),
            self.youtube.search_videos(&video_query, max_videos)
        );

        let news_articles = news.unwrap_or_else(|e| {
            tracing::warn!(team = %primary, error = %e, "news search failed");
            Vec::new()
        });
        let youtube_videos = videos.unwrap_or_else(|e| {
            tracing::warn!(team = %primary, error = %e, "video search failed");
            Vec::new()
        });

        TeamIntelligence {
            team_name: primary,
            news_articles,
            youtube_videos,
            generated_at: Utc::now(),
            summary: None,
        }
    }

    /// Gathers intelligence for both sides of a matchup concurrently.
    pub async fn matchup(&self, team1: &str, team2: &str, days_back: u32) -> MatchupReport {
        tracing::info!(team1, team2, "analyzing matchup");
        let (first, second) = tokio::join!(
            self.team_intelligence(team1, days_back, DEFAULT_MAX_NEWS, DEFAULT_MAX_VIDEOS),
            self.team_intelligence(team2, days_back, DEFAULT_MAX_NEWS, DEFAULT_MAX_VIDEOS)
        );
        MatchupReport {
            team1: team1.to_string(),
            team2: team2.to_string(),
            first,
            second,
            generated_at: Utc::now(),
            summary: None,
        }
    }
}

/// Renders the Markdown intelligence report for one team.
pub fn intelligence_summary(intel: &TeamIntelligence) -> String {
    let mut lines: Vec<String> = vec![
        format!("# Intelligence Report: {}", intel.team_name),
        format!("Generated: {}", intel.generated_at.format("%Y-%m-%d %H:%M")),
        String::new(),
        "## Recent News Articles".to_string(),
    ];

    if intel.news_articles.is_empty() {
        lines.push("No recent news articles found.".to_string());
        lines.push(String::new());
    } else {
        for (i, article) in intel.news_articles.iter().take(SUMMARY_TOP_ITEMS).enumerate() {
            lines.push(format!("{}. **{}**", i + 1, article.title));
            lines.push(format!("   Source: {}", article.source));
            lines.push(format!(
                "   Published: {}",
                article.published_at.format("%Y-%m-%d")
            ));
            if !article.description.is_empty() {
                let preview: String = article
                    .description
                    .chars()
                    .take(DESCRIPTION_PREVIEW_CHARS)
                    .collect();
                lines.push(format!("   Summary: {preview}..."));
            }
            lines.push(format!("   Link: {}", article.url));
            lines.push(String::new());
        }
    }

    lines.push("## Recent YouTube Videos".to_string());
    if intel.youtube_videos.is_empty() {
        lines.push("No recent videos found.".to_string());
        lines.push(String::new());
    } else {
        for (i, video) in intel.youtube_videos.iter().take(SUMMARY_TOP_ITEMS).enumerate() {
            lines.push(format!("{}. **{}**", i + 1, video.title));
            if let Some(channel) = video.channel.as_deref().filter(|c| !c.is_empty()) {
                lines.push(format!("   Channel: {channel}"));
            }
            if let Some(views) = video.view_count.filter(|v| *v > 0) {
                lines.push(format!("   Views: {}", format_thousands(views)));
            }
            lines.push(format!("   Link: {}", video.url));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

/// Renders the Markdown matchup report.
pub fn matchup_summary(report: &MatchupReport) -> String {
    let mut lines: Vec<String> = vec![
        format!(
            "# Strategic Matchup Analysis: {} vs {}",
            report.team1, report.team2
        ),
        format!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M")),
        String::new(),
    ];

    for (label, intel) in [(&report.team1, &report.first), (&report.team2, &report.second)] {
        lines.push(format!("## {label} Intelligence"));
        lines.push(format!(
            "- Recent news articles: {}",
            intel.news_articles.len()
        ));
        lines.push(format!("- Recent videos: {}", intel.youtube_videos.len()));
        if !intel.news_articles.is_empty() {
            lines.push("### Top Headlines:".to_string());
            for article in intel.news_articles.iter().take(MATCHUP_TOP_HEADLINES) {
                lines.push(format!("- {} ({})", article.title, article.source));
            }
        }
        lines.push(String::new());
    }

    lines.push("## Strategic Notes".to_string());
    lines.push("- Review recent performance trends in the articles above".to_string());
    lines.push("- Check video analysis for tactical insights".to_string());
    lines.push("- Look for injury reports or roster changes".to_string());
    lines.push("- Analyze recent game outcomes and patterns".to_string());

    lines.join("\n")
}

/// `1234567` → `"1,234,567"`.
fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
