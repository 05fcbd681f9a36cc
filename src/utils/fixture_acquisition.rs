use crate::api::{CompletionService, FixtureProvider};
use crate::error::{InsightError, InsightResult};
use crate::models::{Fixture, Market};
use crate::utils::dates::{DateWindow, Period};
use crate::utils::prompts::fixture_listing_prompt;
use crate::utils::response_parsing::parse_fixture_listing;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

/// Which source satisfied an acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Primary,
    Fallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Primary => f.write_str("primary"),
            Provenance::Fallback => f.write_str("fallback"),
        }
    }
}

/// Fixtures for one period, tagged with where they came from
#[derive(Debug, Clone, Serialize)]
pub struct AcquiredFixtures {
    pub period: Period,
    pub window: DateWindow,
    pub provenance: Provenance,
    pub fixtures: Vec<Fixture>,
    /// Unparsed fallback response, kept for display
    pub raw_text: Option<String>,
}

impl AcquiredFixtures {
    pub fn get(&self, id: &str) -> Option<&Fixture> {
        self.fixtures.iter().find(|fixture| fixture.id == id)
    }

    /// Attach estimated odds to the fixture with `id`, replacing any earlier
    /// estimate. Empty estimates leave the fixture untouched.
    pub fn attach_odds(&mut self, id: &str, markets: Vec<Market>) -> bool {
        if markets.is_empty() {
            return false;
        }
        match self.fixtures.iter_mut().find(|fixture| fixture.id == id) {
            Some(fixture) => {
                fixture.ai_odds = Some(markets);
                true
            }
            None => false,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }

    pub fn live_count(&self) -> usize {
        self.fixtures.iter().filter(|f| f.status.is_live()).count()
    }
}

/// Call the primary provider once; an empty listing counts as a failure.
async fn fetch_primary(
    primary: &dyn FixtureProvider,
    window: &DateWindow,
) -> InsightResult<Vec<Fixture>> {
    let fixtures = primary.fetch_fixtures(window).await?;
    if fixtures.is_empty() {
        return Err(InsightError::EmptyResult(primary.name().to_string()));
    }
    Ok(fixtures)
}

/// Ask the completion service for a fixture listing and parse what comes back.
pub async fn fetch_fallback_fixtures(
    ai: &dyn CompletionService,
    period: Period,
    window: &DateWindow,
) -> InsightResult<(Vec<Fixture>, String)> {
    let prompt = fixture_listing_prompt(period, window);
    let response = ai.search_grounded(&prompt).await?;
    let fixtures = parse_fixture_listing(&response.text, window.from, Utc::now().timestamp_millis());
    Ok((fixtures, response.text))
}

/// Resolve the fixtures for `period`, relative to the calendar date `today`.
///
/// The primary provider is tried once. Any transport failure or an empty
/// listing switches to the completion-service fallback, which is also tried
/// once. If both fail the caller gets `InsightError::NoDataAvailable`.
pub async fn acquire_fixtures(
    primary: &dyn FixtureProvider,
    ai: &dyn CompletionService,
    period: Period,
    today: NaiveDate,
) -> InsightResult<AcquiredFixtures> {
    let window = DateWindow::for_period(period, today);

    let primary_err = match fetch_primary(primary, &window).await {
        Ok(fixtures) => {
            info!(
                "Loaded {} {} fixtures from {}",
                fixtures.len(),
                period,
                primary.name()
            );
            return Ok(AcquiredFixtures {
                period,
                window,
                provenance: Provenance::Primary,
                fixtures,
                raw_text: None,
            });
        }
        Err(e) => e,
    };

    // Any primary error falls back, unreadable bodies included
    let reason = if primary_err.is_outage() {
        "unavailable"
    } else {
        "returned unreadable data"
    };
    warn!(
        "{} {} for {} ({}), switching to AI fallback",
        primary.name(),
        reason,
        period,
        primary_err
    );

    match fetch_fallback_fixtures(ai, period, &window).await {
        Ok((fixtures, raw_text)) => {
            info!("Loaded {} {} fixtures from AI fallback", fixtures.len(), period);
            Ok(AcquiredFixtures {
                period,
                window,
                provenance: Provenance::Fallback,
                fixtures,
                raw_text: Some(raw_text),
            })
        }
        Err(fallback_err) => {
            error!("All fixture sources failed for {}: {}", period, fallback_err);
            Err(InsightError::NoDataAvailable {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            })
        }
    }
}
