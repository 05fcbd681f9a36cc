pub mod football_data_api;
pub mod gemini_api;

use crate::error::InsightResult;
use crate::models::Fixture;
use crate::utils::dates::DateWindow;
use async_trait::async_trait;

/// Authoritative fixture listing (football-data.org in production)
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    async fn fetch_fixtures(&self, window: &DateWindow) -> InsightResult<Vec<Fixture>>;
}

/// Prose answer from a search-grounded completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundedText {
    pub text: String,
    /// Citation URIs in the order the service returned them, unvalidated
    pub citations: Vec<String>,
}

/// Generative completion service used for fallback discovery and insights
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Free text answer backed by a web search
    async fn search_grounded(&self, prompt: &str) -> InsightResult<GroundedText>;

    /// Raw body of a JSON-only answer
    async fn json_completion(&self, prompt: &str) -> InsightResult<String>;
}
