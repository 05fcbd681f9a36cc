use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Betting markets the AI is allowed to recommend from
pub const BETTING_MARKETS: [&str; 14] = [
    "Match Result (1X2)",
    "Double Chance",
    "First Team to Score",
    "Both Teams to Score (BTTS)",
    "Overs/Unders (Total Goals)",
    "Halftime/Fulltime Result",
    "Odd/Even Total Goals",
    "Half Time Result",
    "2nd Half Match Result",
    "Highest Scoring Half",
    "Correct Score",
    "Handicap",
    "Overs/Unders Corners",
    "Overs/Unders Bookings",
];

/// Shorter spellings models use for catalog entries
const MARKET_ALIASES: [(&str, &str); 4] = [
    ("Halftime/Fulltime", "Halftime/Fulltime Result"),
    ("HT/FT", "Halftime/Fulltime Result"),
    ("2nd Half Result", "2nd Half Match Result"),
    ("Second Half Result", "2nd Half Match Result"),
];

/// Leg counts offered for a multi bet
pub const MULTI_BET_LEG_CHOICES: [usize; 4] = [3, 5, 7, 10];

/// Lifecycle status of a match, as reported by the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Timed,
    InPlay,
    Paused,
    Finished,
    Suspended,
    Postponed,
    Canceled,
    Awarded,
}

impl MatchStatus {
    /// Translate a provider status code. Unknown codes are treated as scheduled.
    pub fn from_code(code: &str) -> Self {
        match code {
            "SCHEDULED" => MatchStatus::Scheduled,
            "TIMED" => MatchStatus::Timed,
            "IN_PLAY" => MatchStatus::InPlay,
            "PAUSED" => MatchStatus::Paused,
            "FINISHED" => MatchStatus::Finished,
            "SUSPENDED" => MatchStatus::Suspended,
            "POSTPONED" => MatchStatus::Postponed,
            "CANCELED" | "CANCELLED" => MatchStatus::Canceled,
            "AWARDED" => MatchStatus::Awarded,
            _ => MatchStatus::Scheduled,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::Timed => "TIMED",
            MatchStatus::InPlay => "IN_PLAY",
            MatchStatus::Paused => "PAUSED",
            MatchStatus::Finished => "FINISHED",
            MatchStatus::Suspended => "SUSPENDED",
            MatchStatus::Postponed => "POSTPONED",
            MatchStatus::Canceled => "CANCELED",
            MatchStatus::Awarded => "AWARDED",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::InPlay | MatchStatus::Paused)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, MatchStatus::Finished)
    }

    pub fn has_started(&self) -> bool {
        self.is_live() || self.is_finished()
    }

    /// Short label shown next to a fixture
    pub fn label(&self) -> &'static str {
        if self.is_live() {
            "LIVE"
        } else if self.is_finished() {
            "FT"
        } else {
            "Upcoming"
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A scheduled, live or finished soccer match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: String,
    pub date: NaiveDate,
    pub time: String, // "HH:MM" in UTC, display only
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub status: MatchStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_odds: Option<Vec<Market>>,
}

impl Fixture {
    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// "2 - 1" once both scores are known
    pub fn score_line(&self) -> Option<String> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some(format!("{} - {}", home, away)),
            _ => None,
        }
    }
}

/// A named betting market with its priced selections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    #[serde(default)]
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub name: String,
    #[serde(deserialize_with = "display_string")]
    pub price: String, // Decimal odds, kept as the display string
}

/// One match's AI verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_text: String,
    pub confidence_score: u8,
    pub best_market: String,
    pub prediction: Option<String>,
    pub reasoning: Option<String>,
    pub catalog_market: Option<&'static str>,
    pub source_urls: Vec<String>,
}

/// A single selection in an accumulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiBetLeg {
    pub fixture: String,
    pub market: String,
    pub prediction: String,
    #[serde(deserialize_with = "display_string")]
    pub odds: String,
    #[serde(default)]
    pub reason: String,
}

/// A generated accumulator slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiBetResult {
    pub legs: Vec<MultiBetLeg>,
    #[serde(deserialize_with = "display_string")]
    pub total_odds: String,
    #[serde(default)]
    pub analysis: String,
}

impl MultiBetResult {
    /// Plain-text slip for pasting into a chat or a bookmaker's bet builder
    pub fn share_text(&self) -> String {
        let legs = self
            .legs
            .iter()
            .map(|leg| {
                format!(
                    "\u{26BD} {}\n\u{1F3AF} {} (@{})",
                    leg.fixture, leg.prediction, leg.odds
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "\u{1F3C6} ProBet AI Safe Multi\n\n{}\n\n\u{1F4CA} Total Odds: {}",
            legs, self.total_odds
        )
    }
}

/// Accepts `"2.10"` as well as `2.1` and keeps the value as text.
fn display_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text.trim().to_string(),
        TextOrNumber::Number(number) => number.to_string(),
    })
}

fn normalize_market_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolve a free-text market label to its catalog entry.
///
/// Matches ignore case and punctuation, and accept the entry's name with or
/// without its parenthetical, or the parenthetical alone ("1X2", "BTTS").
pub fn catalog_market(label: &str) -> Option<&'static str> {
    let wanted = normalize_market_label(label);
    if wanted.is_empty() {
        return None;
    }

    let direct = BETTING_MARKETS.iter().copied().find(|entry| {
        let (base, alias) = match entry.find('(') {
            Some(open) => (&entry[..open], Some(entry[open + 1..].trim_end_matches(')'))),
            None => (*entry, None),
        };
        wanted == normalize_market_label(entry)
            || wanted == normalize_market_label(base)
            || alias.map_or(false, |alias| wanted == normalize_market_label(alias))
    });

    direct.or_else(|| {
        MARKET_ALIASES
            .iter()
            .find(|(alias, _)| wanted == normalize_market_label(alias))
            .map(|(_, entry)| *entry)
    })
}
