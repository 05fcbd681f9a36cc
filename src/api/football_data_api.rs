use crate::api::FixtureProvider;
use crate::error::{compact_error_body, InsightError, InsightResult};
use crate::models::{Fixture, MatchStatus};
use crate::utils::dates::DateWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

pub const FOOTBALL_DATA_BASE_URL: &str = "https://api.football-data.org/v4";

/// Response from football-data.org for the matches listing
#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMatch {
    id: u64,
    utc_date: DateTime<Utc>,
    #[serde(default)]
    status: String,
    competition: ApiCompetition,
    home_team: ApiTeam,
    away_team: ApiTeam,
    #[serde(default)]
    score: Option<ApiScore>,
}

#[derive(Debug, Deserialize)]
struct ApiCompetition {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTeam {
    name: Option<String>,
    short_name: Option<String>,
}

impl ApiTeam {
    fn display_name(&self) -> String {
        self.short_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.name.as_deref())
            .unwrap_or("TBD")
            .to_string()
    }

    fn full_name(&self) -> &str {
        self.name.as_deref().unwrap_or("TBD")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiScore {
    full_time: Option<ApiScorePair>,
}

#[derive(Debug, Deserialize)]
struct ApiScorePair {
    home: Option<u32>,
    away: Option<u32>,
}

fn to_fixture(api_match: ApiMatch) -> Fixture {
    let (home_score, away_score) = api_match
        .score
        .and_then(|score| score.full_time)
        .map(|pair| (pair.home, pair.away))
        .unwrap_or((None, None));

    let raw_string = format!(
        "{} | {} | {} vs {}",
        api_match.utc_date.to_rfc3339(),
        api_match.competition.name,
        api_match.home_team.full_name(),
        api_match.away_team.full_name()
    );

    Fixture {
        id: api_match.id.to_string(),
        date: api_match.utc_date.date_naive(),
        time: api_match.utc_date.format("%H:%M").to_string(),
        league: api_match.competition.name,
        home_team: api_match.home_team.display_name(),
        away_team: api_match.away_team.display_name(),
        status: MatchStatus::from_code(&api_match.status),
        home_score,
        away_score,
        raw_string: Some(raw_string),
        ai_odds: None,
    }
}

pub struct FootballDataClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FootballDataClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, FOOTBALL_DATA_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Fetch matches across all competitions for an inclusive date window
    pub async fn fetch_matches(&self, window: &DateWindow) -> InsightResult<Vec<Fixture>> {
        let url = format!("{}/matches", self.base_url);
        let date_from = window.from.format("%Y-%m-%d").to_string();
        let date_to = window.to.format("%Y-%m-%d").to_string();

        let mut request = self
            .client
            .get(&url)
            .query(&[("dateFrom", date_from.as_str()), ("dateTo", date_to.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.header("X-Auth-Token", key);
        }

        debug!("Requesting football-data.org matches for {}", window);
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Transport(format!(
                "football-data.org returned {}: {}",
                status,
                compact_error_body(&body)
            )));
        }

        let body = response.text().await?;
        let fixtures = parse_matches_response(&body)?;
        info!("football-data.org returned {} fixtures for {}", fixtures.len(), window);
        Ok(fixtures)
    }
}

#[async_trait]
impl FixtureProvider for FootballDataClient {
    fn name(&self) -> &str {
        "football-data.org"
    }

    async fn fetch_fixtures(&self, window: &DateWindow) -> InsightResult<Vec<Fixture>> {
        self.fetch_matches(window).await
    }
}

/// Decode a `/matches` body into fixtures
pub fn parse_matches_response(body: &str) -> InsightResult<Vec<Fixture>> {
    let response: MatchesResponse = serde_json::from_str(body)
        .map_err(|e| InsightError::Parse(format!("football-data.org response: {}", e)))?;
    Ok(response.matches.into_iter().map(to_fixture).collect())
}
