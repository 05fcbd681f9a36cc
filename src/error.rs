use thiserror::Error;

/// Errors raised while talking to the fixture provider or the completion
/// service, or while normalizing what they return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsightError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{0} returned no fixtures")]
    EmptyResult(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("no data available (primary: {primary}; fallback: {fallback})")]
    NoDataAvailable { primary: String, fallback: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl InsightError {
    /// The source was unreachable or had nothing, as opposed to answering
    /// with data that could not be read.
    pub fn is_outage(&self) -> bool {
        matches!(self, InsightError::Transport(_) | InsightError::EmptyResult(_))
    }
}

impl From<reqwest::Error> for InsightError {
    fn from(err: reqwest::Error) -> Self {
        InsightError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        InsightError::Parse(err.to_string())
    }
}

pub type InsightResult<T> = Result<T, InsightError>;

/// Keep error bodies from the remote APIs to a single readable line.
pub(crate) fn compact_error_body(body: &str) -> String {
    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() > 200 {
        let truncated: String = compact.chars().take(200).collect();
        format!("{}...", truncated)
    } else {
        compact
    }
}
