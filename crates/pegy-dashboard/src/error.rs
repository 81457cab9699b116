//! Error types for the dashboard

use pegy_core::PegyError;
use thiserror::Error;

/// Dashboard errors
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Yahoo Finance answered with an error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Completion endpoint error
    #[error("LLM error: {0}")]
    Llm(#[from] pegy_llm::LLMError),

    /// Prompt template error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// AI summary could not be produced
    #[error("{0}")]
    Summary(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unparseable interactive command
    #[error("Command error: {0}")]
    Command(String),

    /// Error from the calculation core or its caches
    #[error(transparent)]
    Core(#[from] PegyError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Surface dashboard failures to the calculator as per-ticker errors
impl From<DashboardError> for PegyError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::DataUnavailable { symbol, reason } => {
                PegyError::DataUnavailable { symbol, reason }
            }
            DashboardError::Core(inner) => inner,
            other => PegyError::Source(other.to_string()),
        }
    }
}
