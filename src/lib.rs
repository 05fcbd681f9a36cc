pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use api::*;
pub use error::*;
pub use models::*;
pub use utils::*;

use config::AppConfig;
use std::sync::Arc;
use utils::dates::{local_today, Period};
use utils::fixture_acquisition::{acquire_fixtures, AcquiredFixtures};

/// Handles to the fixture provider and the completion service, built once at
/// startup and shared by every dashboard operation.
#[derive(Clone)]
pub struct InsightEngine {
    primary: Arc<dyn FixtureProvider>,
    ai: Arc<dyn CompletionService>,
}

impl InsightEngine {
    pub fn new(primary: Arc<dyn FixtureProvider>, ai: Arc<dyn CompletionService>) -> Self {
        Self { primary, ai }
    }

    /// Engine backed by football-data.org and Gemini
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(config.football_data_client()),
            Arc::new(config.gemini_client()),
        )
    }

    /// Fixtures for `period`, relative to the local calendar date
    pub async fn load_fixtures(&self, period: Period) -> InsightResult<AcquiredFixtures> {
        acquire_fixtures(self.primary.as_ref(), self.ai.as_ref(), period, local_today()).await
    }

    pub async fn analyze_match(&self, fixture: &Fixture) -> InsightResult<AnalysisResult> {
        insights::analyze_match(self.ai.as_ref(), fixture).await
    }

    pub async fn estimate_odds(&self, fixture: &Fixture) -> Vec<Market> {
        insights::estimate_odds(self.ai.as_ref(), fixture).await
    }

    pub async fn generate_multi_bet(
        &self,
        fixtures: &[Fixture],
        legs: usize,
    ) -> InsightResult<MultiBetResult> {
        insights::generate_multi_bet(self.ai.as_ref(), fixtures, legs).await
    }
}
