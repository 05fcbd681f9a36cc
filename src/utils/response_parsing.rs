//! Parsers for the loosely structured text the completion service returns.
//!
//! Every function here is pure: text in, optional typed value out. When the
//! model drifts from the requested format, each field can be checked on its
//! own.

use crate::models::{Fixture, MatchStatus};
use chrono::NaiveDate;
use reqwest::Url;
use tracing::debug;

/// Id prefix for fixtures discovered through the fallback source
pub const FALLBACK_ID_PREFIX: &str = "gemini";

/// Teams and kickoff parsed from one `TIME | LEAGUE | HOME vs AWAY` line
#[derive(Debug, Clone, PartialEq)]
pub struct ListingLine {
    pub time: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub clean_line: String,
}

fn strip_markup(line: &str) -> String {
    line.replace("**", "")
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
        .to_string()
}

/// Parse a single fixture listing line. Anything off-format yields `None`.
pub fn parse_listing_line(line: &str) -> Option<ListingLine> {
    let clean_line = strip_markup(line);
    let parts: Vec<&str> = clean_line.split('|').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }

    let teams: Vec<&str> = parts[2].split("vs").map(str::trim).collect();
    if teams.len() != 2 || teams[0].is_empty() || teams[1].is_empty() {
        return None;
    }

    Some(ListingLine {
        time: parts[0].to_string(),
        league: parts[1].to_string(),
        home_team: teams[0].to_string(),
        away_team: teams[1].to_string(),
        clean_line: clean_line.clone(),
    })
}

/// Turn a fallback listing into fixtures, dropping the lines that don't parse.
///
/// Ids are `gemini-<line index>-<batch stamp>` and are only unique within one batch.
pub fn parse_fixture_listing(text: &str, date: NaiveDate, batch_stamp: i64) -> Vec<Fixture> {
    let mut fixtures = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(parsed) = parse_listing_line(line) else {
            debug!("Dropping unparseable fixture line: {}", line.trim());
            continue;
        };

        fixtures.push(Fixture {
            id: format!("{}-{}-{}", FALLBACK_ID_PREFIX, index, batch_stamp),
            date,
            time: parsed.time,
            league: parsed.league,
            home_team: parsed.home_team,
            away_team: parsed.away_team,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            raw_string: Some(parsed.clean_line),
            ai_odds: None,
        });
    }

    fixtures
}

/// Byte offset just past `label` in `line`, ignoring ASCII case.
fn find_label(line: &str, label: &str) -> Option<usize> {
    line.to_ascii_lowercase()
        .find(&label.to_ascii_lowercase())
        .map(|idx| idx + label.len())
}

/// Value after `label` and a colon on a single line, bold markers removed.
fn labeled_value_in_line(line: &str, label: &str) -> Option<String> {
    let rest = &line[find_label(line, label)?..];
    let rest = rest.trim_start_matches(|c: char| c == '*' || c.is_whitespace());
    let value = rest.strip_prefix(':')?.replace('*', "");
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Value of a `**Label:** value` verdict line, with the bold markers removed.
pub fn parse_labeled_value(text: &str, label: &str) -> Option<String> {
    text.lines()
        .find_map(|line| labeled_value_in_line(line, label))
}

/// Percentage from the first `Confidence:` line whose value starts with
/// digits, capped at 100. Prose that merely mentions confidence is skipped.
pub fn parse_confidence(text: &str) -> Option<u8> {
    text.lines().find_map(|line| {
        let value = labeled_value_in_line(line, "Confidence")?;
        let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        let value = digits.parse::<u32>().unwrap_or(u32::MAX);
        Some(value.min(100) as u8)
    })
}

pub fn parse_best_market(text: &str) -> Option<String> {
    parse_labeled_value(text, "Best Market")
}

pub fn parse_prediction(text: &str) -> Option<String> {
    parse_labeled_value(text, "Prediction")
}

pub fn parse_reasoning(text: &str) -> Option<String> {
    parse_labeled_value(text, "Reasoning")
}

/// Keep only absolute http(s) URLs, in their original order.
pub fn well_formed_urls<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let candidate = candidate.as_ref().trim();
            let url = Url::parse(candidate).ok()?;
            match url.scheme() {
                "http" | "https" if url.host().is_some() => Some(candidate.to_string()),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_parse_listing_line() {
        let line = parse_listing_line("14:00 | Premier League | Arsenal vs Chelsea").unwrap();
        assert_eq!(line.time, "14:00");
        assert_eq!(line.league, "Premier League");
        assert_eq!(line.home_team, "Arsenal");
        assert_eq!(line.away_team, "Chelsea");
    }

    #[test]
    fn test_listing_line_with_markup_and_extra_segments() {
        let line =
            parse_listing_line("- **19:00** | Brasileirão | Flamengo vs Palmeiras | Maracanã")
                .unwrap();
        assert_eq!(line.time, "19:00");
        assert_eq!(line.league, "Brasileirão");
        assert_eq!(line.home_team, "Flamengo");
        assert_eq!(line.away_team, "Palmeiras");
        assert_eq!(line.clean_line, "19:00 | Brasileirão | Flamengo vs Palmeiras | Maracanã");
    }

    #[test]
    fn test_listing_line_rejections() {
        assert!(parse_listing_line("14:00 | Premier League | TBD").is_none());
        assert!(parse_listing_line("14:00 | Arsenal vs Chelsea").is_none());
        assert!(parse_listing_line("Here are today's matches:").is_none());
        assert!(parse_listing_line("14:00 | Cup | vs Chelsea").is_none());
    }

    #[test]
    fn test_parse_fixture_listing_keeps_good_lines() {
        let text = "Here are the matches:\n\
                    14:00 | Premier League | Arsenal vs Chelsea\n\
                    14:00 | Premier League | TBD\n\
                    \n\
                    16:30 | Eredivisie | Ajax vs PSV\n";
        let fixtures = parse_fixture_listing(text, date(), 1_700_000_000_000);
        assert_eq!(fixtures.len(), 2);

        let first = &fixtures[0];
        assert_eq!(first.id, "gemini-1-1700000000000");
        assert_eq!(first.time, "14:00");
        assert_eq!(first.league, "Premier League");
        assert_eq!(first.home_team, "Arsenal");
        assert_eq!(first.away_team, "Chelsea");
        assert_eq!(first.status, MatchStatus::Scheduled);
        assert_eq!(first.home_score, None);
        assert_eq!(first.away_score, None);
        assert_eq!(first.date, date());

        assert_eq!(fixtures[1].id, "gemini-4-1700000000000");
        assert_ne!(fixtures[0].id, fixtures[1].id);
    }

    #[test]
    fn test_parse_confidence() {
        assert_eq!(parse_confidence("**Confidence:** 78%"), Some(78));
        assert_eq!(parse_confidence("Confidence: 64"), Some(64));
        assert_eq!(parse_confidence("**Confidence**: *91%*"), Some(91));
        assert_eq!(parse_confidence("confidence score: 91%"), None);
        assert_eq!(parse_confidence("**Confidence:** 250%"), Some(100));
        assert_eq!(parse_confidence("## Verdict\n**Prediction:** Over 2.5"), None);
        assert_eq!(parse_confidence("**Confidence:** high"), None);
    }

    #[test]
    fn test_parse_confidence_ignores_prose_mentions() {
        let text = "## Match Analysis\n\
                    Chelsea's confidence is fragile after 3 straight defeats.\n\n\
                    ## Verdict\n\
                    **Best Market:** Double Chance\n\
                    **Confidence:** 78%";
        assert_eq!(parse_confidence(text), Some(78));

        let text = "Confidence: low after 2 draws\n**Confidence:** 55%";
        assert_eq!(parse_confidence(text), Some(55));
    }

    #[test]
    fn test_parse_best_market() {
        assert_eq!(
            parse_best_market("**Best Market:** Double Chance").as_deref(),
            Some("Double Chance")
        );
        assert_eq!(
            parse_best_market("**Best Market**: *Both Teams to Score (BTTS)*").as_deref(),
            Some("Both Teams to Score (BTTS)")
        );
        assert_eq!(parse_best_market("No verdict here"), None);
        assert_eq!(parse_best_market("**Best Market:** **"), None);
    }

    #[test]
    fn test_parse_verdict_block() {
        let text = "## Match Analysis\nArsenal unbeaten in 8.\n\n## Verdict\n\
                    **Best Market:** Overs/Unders (Total Goals)\n\
                    **Prediction:** Over 2.5 Goals\n\
                    **Confidence:** 72%\n\
                    **Reasoning:** Both sides average 3.1 goals per game.";
        assert_eq!(parse_confidence(text), Some(72));
        assert_eq!(
            parse_best_market(text).as_deref(),
            Some("Overs/Unders (Total Goals)")
        );
        assert_eq!(parse_prediction(text).as_deref(), Some("Over 2.5 Goals"));
        assert_eq!(
            parse_reasoning(text).as_deref(),
            Some("Both sides average 3.1 goals per game.")
        );
    }

    #[test]
    fn test_well_formed_urls() {
        let urls = well_formed_urls([
            "https://www.bbc.co.uk/sport/football",
            "",
            "not a url",
            "ftp://files.example.com/x",
            "https://vertexaisearch.cloud.google.com/grounding-api-redirect/abc",
            "https://www.bbc.co.uk/sport/football",
        ]);
        assert_eq!(
            urls,
            vec![
                "https://www.bbc.co.uk/sport/football".to_string(),
                "https://vertexaisearch.cloud.google.com/grounding-api-redirect/abc".to_string(),
                "https://www.bbc.co.uk/sport/football".to_string(),
            ]
        );
    }
}
