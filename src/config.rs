use crate::api::football_data_api::{FootballDataClient, FOOTBALL_DATA_BASE_URL};
use crate::api::gemini_api::{GeminiClient, DEFAULT_GEMINI_MODEL, GEMINI_BASE_URL};
use crate::error::{InsightError, InsightResult};
use std::env;
use std::net::SocketAddr;
use tracing::warn;

const DEFAULT_WEB_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub football_data_key: Option<String>,
    pub football_data_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub web_addr: SocketAddr,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl AppConfig {
    /// Read settings from the environment (call `dotenv::dotenv()` first).
    ///
    /// Missing API keys are allowed; requests are still sent and the remote
    /// decides whether to reject them.
    pub fn from_env() -> InsightResult<Self> {
        let web_addr = non_empty_var("WEB_ADDR")
            .unwrap_or_else(|| DEFAULT_WEB_ADDR.to_string())
            .parse()
            .map_err(|e| InsightError::Config(format!("WEB_ADDR: {}", e)))?;

        let config = Self {
            football_data_key: non_empty_var("FOOTBALL_DATA_KEY"),
            football_data_base_url: non_empty_var("FOOTBALL_DATA_BASE_URL")
                .unwrap_or_else(|| FOOTBALL_DATA_BASE_URL.to_string()),
            gemini_api_key: non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY")),
            gemini_model: non_empty_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: non_empty_var("GEMINI_BASE_URL")
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            web_addr,
        };

        if config.football_data_key.is_none() {
            warn!("FOOTBALL_DATA_KEY not set; football-data.org may reject requests");
        }
        if config.gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not set; AI fallback and insights will fail");
        }

        Ok(config)
    }

    pub fn football_data_client(&self) -> FootballDataClient {
        FootballDataClient::with_base_url(
            self.football_data_key.clone(),
            self.football_data_base_url.clone(),
        )
    }

    pub fn gemini_client(&self) -> GeminiClient {
        GeminiClient::with_base_url(
            self.gemini_api_key.clone().unwrap_or_default(),
            self.gemini_model.clone(),
            self.gemini_base_url.clone(),
        )
    }
}
