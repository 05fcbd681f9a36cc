use crate::api::CompletionService;
use crate::error::{InsightError, InsightResult};
use crate::models::{catalog_market, AnalysisResult, Fixture, Market, MultiBetResult};
use crate::utils::json_extract::{parse_json_response, ParseMode};
use crate::utils::prompts::{match_analysis_prompt, multi_bet_prompt, odds_estimate_prompt};
use crate::utils::response_parsing::{
    parse_best_market, parse_confidence, parse_prediction, parse_reasoning, well_formed_urls,
};
use tracing::{info, warn};

/// Fixtures beyond this are left out of the multi bet prompt
pub const MAX_MULTI_BET_FIXTURES: usize = 40;

pub const DEFAULT_BEST_MARKET: &str = "General";
pub const ANALYSIS_UNAVAILABLE: &str = "Analysis unavailable.";

/// Build an `AnalysisResult` from the model's markdown verdict and citations.
pub fn analysis_from_text(text: &str, citations: &[String]) -> AnalysisResult {
    let analysis_text = if text.trim().is_empty() {
        ANALYSIS_UNAVAILABLE.to_string()
    } else {
        text.to_string()
    };
    let best_market =
        parse_best_market(&analysis_text).unwrap_or_else(|| DEFAULT_BEST_MARKET.to_string());

    AnalysisResult {
        confidence_score: parse_confidence(&analysis_text).unwrap_or(0),
        catalog_market: catalog_market(&best_market),
        prediction: parse_prediction(&analysis_text),
        reasoning: parse_reasoning(&analysis_text),
        source_urls: well_formed_urls(citations),
        best_market,
        analysis_text,
    }
}

/// Ask for a search-grounded deep dive on one fixture.
///
/// Missing verdict fields fall back to their defaults; a failed request is
/// returned to the caller.
pub async fn analyze_match(
    ai: &dyn CompletionService,
    fixture: &Fixture,
) -> InsightResult<AnalysisResult> {
    let prompt = match_analysis_prompt(fixture);
    let response = ai.search_grounded(&prompt).await?;
    let analysis = analysis_from_text(&response.text, &response.citations);

    info!(
        "Analysis for {}: {} ({}% confidence, {} sources)",
        fixture.matchup(),
        analysis.best_market,
        analysis.confidence_score,
        analysis.source_urls.len()
    );
    if analysis.catalog_market.is_none() {
        warn!(
            "Best market '{}' for {} is not in the market catalog",
            analysis.best_market,
            fixture.matchup()
        );
    }

    Ok(analysis)
}

fn is_decimal_price(price: &str) -> bool {
    price
        .parse::<f64>()
        .map(|value| value.is_finite() && value >= 0.0)
        .unwrap_or(false)
}

/// Drop selections without a usable decimal price, then empty markets.
pub fn sanitize_markets(markets: Vec<Market>) -> Vec<Market> {
    markets
        .into_iter()
        .filter_map(|mut market| {
            market
                .selections
                .retain(|selection| is_decimal_price(&selection.price));
            if market.name.trim().is_empty() || market.selections.is_empty() {
                None
            } else {
                Some(market)
            }
        })
        .collect()
}

/// Decode an odds response. Anything unreadable is treated as "no odds".
pub fn markets_from_json(text: &str) -> Vec<Market> {
    parse_json_response::<Vec<Market>>(text, ParseMode::Lenient)
        .map(sanitize_markets)
        .unwrap_or_default()
}

/// Estimate 1X2, double chance, BTTS and over/under 2.5 odds for a fixture.
///
/// Best effort: every failure comes back as an empty list.
pub async fn estimate_odds(ai: &dyn CompletionService, fixture: &Fixture) -> Vec<Market> {
    let prompt = odds_estimate_prompt(fixture);
    match ai.json_completion(&prompt).await {
        Ok(text) => {
            let markets = markets_from_json(&text);
            info!("Estimated {} odds markets for {}", markets.len(), fixture.matchup());
            markets
        }
        Err(e) => {
            warn!("Odds estimation failed for {}: {}", fixture.matchup(), e);
            Vec::new()
        }
    }
}

/// Decode a multi bet slip. Unlike odds, an unreadable slip is an error.
pub fn multi_bet_from_json(text: &str) -> InsightResult<MultiBetResult> {
    let slip: MultiBetResult = parse_json_response::<Option<MultiBetResult>>(text, ParseMode::Strict)?
        .ok_or_else(|| InsightError::Parse("multi bet response was null".to_string()))?;
    if slip.legs.is_empty() {
        return Err(InsightError::Parse("multi bet slip has no legs".to_string()));
    }
    Ok(slip)
}

/// Build a "safe" accumulator with `legs` selections from the first
/// `MAX_MULTI_BET_FIXTURES` fixtures.
pub async fn generate_multi_bet(
    ai: &dyn CompletionService,
    fixtures: &[Fixture],
    legs: usize,
) -> InsightResult<MultiBetResult> {
    if legs == 0 {
        return Err(InsightError::InvalidRequest(
            "a multi bet needs at least one leg".to_string(),
        ));
    }
    if fixtures.is_empty() {
        return Err(InsightError::InvalidRequest(
            "no fixtures loaded to build a multi bet from".to_string(),
        ));
    }

    let candidates = &fixtures[..fixtures.len().min(MAX_MULTI_BET_FIXTURES)];
    let prompt = multi_bet_prompt(candidates, legs);
    let text = ai.json_completion(&prompt).await?;
    let slip = multi_bet_from_json(&text)?;

    if slip.legs.len() != legs {
        warn!("Requested {} legs, model returned {}", legs, slip.legs.len());
    }
    info!(
        "Generated {}-leg multi bet at total odds {}",
        slip.legs.len(),
        slip.total_odds
    );
    Ok(slip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GroundedText;
    use crate::models::MatchStatus;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Replays canned responses and records every prompt it receives
    struct ScriptedAi {
        grounded: InsightResult<GroundedText>,
        json: InsightResult<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedAi {
        fn grounded(text: &str, citations: &[&str]) -> Self {
            Self {
                grounded: Ok(GroundedText {
                    text: text.to_string(),
                    citations: citations.iter().map(|c| c.to_string()).collect(),
                }),
                json: Err(InsightError::Transport("not scripted".to_string())),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn json(result: InsightResult<&str>) -> Self {
            Self {
                grounded: Err(InsightError::Transport("not scripted".to_string())),
                json: result.map(str::to_string),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                grounded: Err(InsightError::Transport("503".to_string())),
                json: Err(InsightError::Transport("503".to_string())),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedAi {
        async fn search_grounded(&self, prompt: &str) -> InsightResult<GroundedText> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.grounded.clone()
        }

        async fn json_completion(&self, prompt: &str) -> InsightResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.json.clone()
        }
    }

    fn fixture(n: usize) -> Fixture {
        Fixture {
            id: n.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            time: "18:30".to_string(),
            league: "Ligue 1".to_string(),
            home_team: format!("Home{}", n),
            away_team: format!("Away{}", n),
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            raw_string: None,
            ai_odds: None,
        }
    }

    const VERDICT: &str = "## Match Analysis\nHome1 have won 4 of 5.\n\n## Verdict\n\
                           **Best Market:** Double Chance\n\
                           **Prediction:** Home1 or Draw\n\
                           **Confidence:** 78%\n\
                           **Reasoning:** Away1 winless on the road.";

    #[tokio::test]
    async fn test_analyze_match_extracts_verdict() {
        let ai = ScriptedAi::grounded(
            VERDICT,
            &["https://www.lequipe.fr/Football", "", "https://fbref.com/en/"],
        );

        let analysis = analyze_match(&ai, &fixture(1)).await.unwrap();

        assert_eq!(analysis.analysis_text, VERDICT);
        assert_eq!(analysis.confidence_score, 78);
        assert_eq!(analysis.best_market, "Double Chance");
        assert_eq!(analysis.catalog_market, Some("Double Chance"));
        assert_eq!(analysis.prediction.as_deref(), Some("Home1 or Draw"));
        assert_eq!(
            analysis.source_urls,
            vec![
                "https://www.lequipe.fr/Football".to_string(),
                "https://fbref.com/en/".to_string()
            ]
        );

        let prompts = ai.prompts.lock().unwrap();
        assert!(prompts[0].contains("Home1 and Away1 (Ligue 1)"));
    }

    #[tokio::test]
    async fn test_analyze_match_defaults() {
        let ai = ScriptedAi::grounded("Both teams are in decent form.", &[]);

        let analysis = analyze_match(&ai, &fixture(1)).await.unwrap();

        assert_eq!(analysis.confidence_score, 0);
        assert_eq!(analysis.best_market, "General");
        assert_eq!(analysis.catalog_market, None);
        assert!(analysis.prediction.is_none());
        assert!(analysis.source_urls.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_match_empty_text() {
        let ai = ScriptedAi::grounded("", &[]);
        let analysis = analyze_match(&ai, &fixture(1)).await.unwrap();
        assert_eq!(analysis.analysis_text, ANALYSIS_UNAVAILABLE);
        assert_eq!(analysis.confidence_score, 0);
    }

    #[tokio::test]
    async fn test_analyze_match_transport_failure_propagates() {
        let ai = ScriptedAi::failing();
        let result = analyze_match(&ai, &fixture(1)).await;
        assert!(matches!(result, Err(InsightError::Transport(_))));
    }

    #[tokio::test]
    async fn test_estimate_odds_parses_markets() {
        let ai = ScriptedAi::json(Ok(r#"[
            {"name": "Match Result", "selections": [
                {"name": "Home1", "price": "2.10"},
                {"name": "Draw", "price": "3.40"},
                {"name": "Away1", "price": 3.1}
            ]},
            {"name": "Both Teams to Score", "selections": [
                {"name": "Yes", "price": "1.80"},
                {"name": "No", "price": "N/A"}
            ]},
            {"name": "Over/Under 2.5", "selections": [
                {"name": "Over", "price": "-1.5"}
            ]}
        ]"#));

        let markets = estimate_odds(&ai, &fixture(1)).await;

        assert_eq!(markets.len(), 2);
        assert_eq!(markets[0].selections.len(), 3);
        assert_eq!(markets[0].selections[2].price, "3.1");
        assert_eq!(markets[1].selections.len(), 1);
        assert_eq!(markets[1].selections[0].name, "Yes");
    }

    #[tokio::test]
    async fn test_estimate_odds_invalid_json_is_empty() {
        let ai = ScriptedAi::json(Ok("I think the home side is favourite."));
        assert!(estimate_odds(&ai, &fixture(1)).await.is_empty());
    }

    #[tokio::test]
    async fn test_estimate_odds_transport_failure_is_empty() {
        let ai = ScriptedAi::failing();
        assert!(estimate_odds(&ai, &fixture(1)).await.is_empty());
    }

    const SLIP: &str = r#"{
        "legs": [
            {"fixture": "Home1 vs Away1", "market": "Double Chance", "prediction": "Home1 or Draw", "odds": "1.25", "reason": "Unbeaten at home"},
            {"fixture": "Home2 vs Away2", "market": "Overs/Unders (Total Goals)", "prediction": "Over 1.5", "odds": "1.30", "reason": "High scoring"},
            {"fixture": "Home3 vs Away3", "market": "Double Chance", "prediction": "Away3 or Draw", "odds": 1.4, "reason": "Strong away form"}
        ],
        "totalOdds": "2.28",
        "analysis": "Low-variance selections."
    }"#;

    #[tokio::test]
    async fn test_generate_multi_bet() {
        let ai = ScriptedAi::json(Ok(SLIP));
        let fixtures: Vec<Fixture> = (1..=5).map(fixture).collect();

        let slip = generate_multi_bet(&ai, &fixtures, 3).await.unwrap();

        assert_eq!(slip.legs.len(), 3);
        assert_eq!(slip.legs[2].odds, "1.4");
        assert_eq!(slip.total_odds, "2.28");
        assert_eq!(slip.analysis, "Low-variance selections.");
    }

    #[tokio::test]
    async fn test_generate_multi_bet_truncates_fixture_list() {
        let ai = ScriptedAi::json(Ok(SLIP));
        let fixtures: Vec<Fixture> = (1..=60).map(fixture).collect();

        generate_multi_bet(&ai, &fixtures, 3).await.unwrap();

        let prompts = ai.prompts.lock().unwrap();
        assert!(prompts[0].contains("Home40 vs Away40"));
        assert!(!prompts[0].contains("Home41 vs Away41"));
    }

    #[tokio::test]
    async fn test_generate_multi_bet_invalid_json_fails() {
        let ai = ScriptedAi::json(Ok("{\"legs\": [ {\"fixture\": "));
        let result = generate_multi_bet(&ai, &[fixture(1)], 3).await;
        assert!(matches!(result, Err(InsightError::Parse(_))));
    }

    #[tokio::test]
    async fn test_generate_multi_bet_rejects_empty_slip() {
        let ai = ScriptedAi::json(Ok(r#"{"legs": [], "totalOdds": "1.00", "analysis": ""}"#));
        let result = generate_multi_bet(&ai, &[fixture(1)], 3).await;
        assert!(matches!(result, Err(InsightError::Parse(_))));

        let ai = ScriptedAi::json(Ok("null"));
        let result = generate_multi_bet(&ai, &[fixture(1)], 3).await;
        assert!(matches!(result, Err(InsightError::Parse(_))));
    }

    #[tokio::test]
    async fn test_generate_multi_bet_validates_request() {
        let ai = ScriptedAi::json(Ok(SLIP));
        let result = generate_multi_bet(&ai, &[fixture(1)], 0).await;
        assert!(matches!(result, Err(InsightError::InvalidRequest(_))));
        let result = generate_multi_bet(&ai, &[], 3).await;
        assert!(matches!(result, Err(InsightError::InvalidRequest(_))));
        assert!(ai.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_multi_bet_transport_failure_propagates() {
        let ai = ScriptedAi::failing();
        let result = generate_multi_bet(&ai, &[fixture(1)], 5).await;
        assert!(matches!(result, Err(InsightError::Transport(_))));
    }

    #[test]
    fn test_generate_multi_bet_accepts_any_leg_count() {
        let fixtures: Vec<Fixture> = (1..=3).map(fixture).collect();
        let prompt = multi_bet_prompt(&fixtures, 12);
        assert!(prompt.contains("exactly 12 selections"));
    }
}
