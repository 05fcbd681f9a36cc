use crate::models::{Fixture, BETTING_MARKETS};
use crate::utils::dates::{DateWindow, Period};

/// Leagues named in the fallback discovery request
const MAJOR_LEAGUES: [&str; 12] = [
    "Premier League",
    "La Liga",
    "Serie A",
    "Bundesliga",
    "Ligue 1",
    "Eredivisie",
    "Primeira Liga",
    "Championship",
    "MLS",
    "Brasileirão",
    "J-League",
    "Champions League",
];

fn market_list() -> String {
    BETTING_MARKETS
        .iter()
        .map(|market| format!("- {}", market))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn fixture_listing_prompt(period: Period, window: &DateWindow) -> String {
    format!(
        "Search for a comprehensive list of professional soccer matches scheduled for {period} ({window}).\n\
         Include all professional leagues globally (e.g. {leagues}, etc.).\n\n\
         Output one match per line, strictly in this format:\n\
         TIME (UTC) | LEAGUE NAME | HOME TEAM vs AWAY TEAM\n\n\
         Example:\n\
         14:00 | Premier League | Arsenal vs Chelsea\n\
         16:30 | Eredivisie | Ajax vs PSV\n\n\
         Do not include any introductory text or bolding. Just the list.",
        period = period,
        window = window,
        leagues = MAJOR_LEAGUES.join(", "),
    )
}

pub fn match_analysis_prompt(fixture: &Fixture) -> String {
    let score = match fixture.score_line() {
        Some(score) => format!(
            "- Current Score: {} {} {}\n",
            fixture.home_team, score, fixture.away_team
        ),
        None => String::new(),
    };

    format!(
        "Act as an expert soccer betting analyst. Study the game between {home} and {away} ({league}) \
         to find the highest probability bet.\n\n\
         Match Details:\n\
         - Date: {date}\n\
         - Time: {time} UTC\n\
         - Status: {status}\n\
         {score}\n\
         Research team form over the last 5 matches, the last 3-5 head-to-head meetings, goals \
         scored and conceded, corner and card trends, injuries, suspensions and motivation.\n\n\
         Then choose the SINGLE BEST BET from these allowed markets:\n\
         {markets}\n\n\
         Output strictly in Markdown:\n\
         ## Match Analysis\n\
         [Detailed breakdown of form, H2H and key stats]\n\n\
         ## Verdict\n\
         **Best Market:** [Market name from the list]\n\
         **Prediction:** [Specific outcome]\n\
         **Confidence:** [0-100]%\n\
         **Reasoning:** [The key stat behind the prediction]",
        home = fixture.home_team,
        away = fixture.away_team,
        league = fixture.league,
        date = fixture.date.format("%Y-%m-%d"),
        time = fixture.time,
        status = fixture.status,
        score = score,
        markets = market_list(),
    )
}

pub fn odds_estimate_prompt(fixture: &Fixture) -> String {
    format!(
        "Act as a bookmaker. Estimate decimal odds for {home} vs {away} ({league}) based on team \
         reputation and recent form, for exactly these markets:\n\
         1. Match Result (1X2)\n\
         2. Double Chance\n\
         3. Both Teams to Score (BTTS)\n\
         4. Over/Under 2.5 Goals\n\n\
         Output STRICTLY valid JSON in this structure:\n\
         [\n\
           {{\n\
             \"name\": \"Match Result\",\n\
             \"selections\": [\n\
               {{ \"name\": \"{home}\", \"price\": \"2.10\" }},\n\
               {{ \"name\": \"Draw\", \"price\": \"3.40\" }},\n\
               {{ \"name\": \"{away}\", \"price\": \"3.10\" }}\n\
             ]\n\
           }}\n\
         ]",
        home = fixture.home_team,
        away = fixture.away_team,
        league = fixture.league,
    )
}

pub fn multi_bet_prompt(fixtures: &[Fixture], legs: usize) -> String {
    let match_list = fixtures
        .iter()
        .map(|f| format!("{}: {} vs {} ({})", f.league, f.home_team, f.away_team, f.time))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Act as a conservative soccer betting strategist. Build a \"Safe Multi Bet\" accumulator \
         with exactly {legs} selections from the matches below.\n\n\
         1. Pick the {legs} matches with the highest probability of winning.\n\
         2. For each, choose the safest market from: {markets}.\n\
         3. Prefer Double Chance or Over/Under goals when safer than the match winner.\n\
         4. Estimate realistic decimal odds for each leg.\n\n\
         Match List:\n\
         {match_list}\n\n\
         Output strictly in this JSON format:\n\
         {{\n\
           \"legs\": [\n\
             {{ \"fixture\": \"Home vs Away\", \"market\": \"Market Name\", \"prediction\": \"Specific Outcome\", \"odds\": \"1.xx\", \"reason\": \"Short reason\" }}\n\
           ],\n\
           \"totalOdds\": \"Approx Total Odds\",\n\
           \"analysis\": \"Brief summary of why this accumulator is safe.\"\n\
         }}",
        legs = legs,
        markets = BETTING_MARKETS.join(", "),
        match_list = match_list,
    )
}
