//! MLB club alias table.
//!
//! Users type "sox", "LA Dodgers" or "nyy"; upstream searches work best with
//! the canonical names. The first alias of each entry is the one used as the
//! primary search term.

/// Lowercase lookup key → search aliases, primary first.
pub const MLB_TEAM_ALIASES: &[(&str, &[&str])] = &[
    ("yankees", &["Yankees", "New York Yankees", "NY Yankees"]),
    ("red sox", &["Red Sox", "Boston Red Sox"]),
    ("dodgers", &["Dodgers", "Los Angeles Dodgers", "LA Dodgers"]),
    ("giants", &["Giants", "San Francisco Giants", "SF Giants"]),
    ("cubs", &["Cubs", "Chicago Cubs"]),
    ("mets", &["Mets", "New York Mets", "NY Mets"]),
    ("astros", &["Astros", "Houston Astros"]),
    ("braves", &["Braves", "Atlanta Braves"]),
    ("phillies", &["Phillies", "Philadelphia Phillies"]),
    ("padres", &["Padres", "San Diego Padres"]),
    ("angels", &["Angels", "Los Angeles Angels", "LA Angels"]),
    ("mariners", &["Mariners", "Seattle Mariners"]),
    ("rangers", &["Rangers", "Texas Rangers"]),
    ("athletics", &["Athletics", "Oakland Athletics", "A's"]),
    ("blue jays", &["Blue Jays", "Toronto Blue Jays"]),
    ("orioles", &["Orioles", "Baltimore Orioles"]),
    ("rays", &["Rays", "Tampa Bay Rays"]),
    ("white sox", &["White Sox", "Chicago White Sox"]),
    ("guardians", &["Guardians", "Cleveland Guardians"]),
    ("tigers", &["Tigers", "Detroit Tigers"]),
    ("twins", &["Twins", "Minnesota Twins"]),
    ("royals", &["Royals", "Kansas City Royals"]),
    ("cardinals", &["Cardinals", "St. Louis Cardinals"]),
    ("brewers", &["Brewers", "Milwaukee Brewers"]),
    ("reds", &["Reds", "Cincinnati Reds"]),
    ("pirates", &["Pirates", "Pittsburgh Pirates"]),
    ("nationals", &["Nationals", "Washington Nationals"]),
    ("marlins", &["Marlins", "Miami Marlins"]),
    ("diamondbacks", &["Diamondbacks", "Arizona Diamondbacks"]),
    ("rockies", &["Rockies", "Colorado Rockies"]),
];

/// Returns search terms for a user-supplied team name, primary term first.
///
/// Matching is substring-based and follows table order: the first entry
/// whose key, or any of whose aliases, contains the trimmed lowercase input
/// wins. Unknown input is returned title-cased as the only term. The result
/// is never empty.
pub fn team_search_terms(team_input: &str) -> Vec<String> {
    let needle = team_input.trim().to_lowercase();
    MLB_TEAM_ALIASES
        .iter()
        .find(|(key, aliases)| {
            key.contains(&needle)
                || aliases
                    .iter()
                    .any(|alias| alias.to_lowercase().contains(&needle))
        })
        .map(|(_, aliases)| aliases.iter().map(|a| a.to_string()).collect())
        .unwrap_or_else(|| vec![title_case(team_input)])
}

/// Uppercases the first letter of every alphabetic run and lowercases the
/// rest.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
