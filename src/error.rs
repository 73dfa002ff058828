//! Error taxonomy for the scanner.
//!
//! Only [`ConfigError`] is fatal; everything else is recovered where it is
//! raised and the scan carries on.

use thiserror::Error;

/// Startup misconfiguration. Raised before the scan loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Transient failure talking to the market data source.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {endpoint}")]
    Http { endpoint: String, status: u16 },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl MarketDataError {
    /// Worth retrying: network failures, rate limiting and server errors
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::Request(_) => true,
            MarketDataError::Http { status, .. } => *status == 429 || *status >= 500,
            MarketDataError::Decode(_) => false,
        }
    }
}

/// Reasons a symbol could not be classified.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("insufficient history: have {available} points, need {required}")]
    InsufficientHistory { available: usize, required: usize },
}

/// Failure talking to the Telegram Bot API.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("telegram rejected message for chat {chat_id}: {description}")]
    Rejected { chat_id: i64, description: String },

    #[error("telegram api error: {0}")]
    Api(String),
}

/// Subscriber persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid subscriber file: {0}")]
    Format(#[from] serde_json::Error),
}
