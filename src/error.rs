//! Error types for the bias bot

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, BotError>;

/// Everything that can go wrong between fetching candles and posting a report
#[derive(Debug, Error)]
pub enum BotError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request for {symbol} timed out after {secs}s")]
    Timeout { symbol: String, secs: u64 },

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed kline: {0}")]
    MalformedKline(String),

    #[error("Insufficient data for {symbol}: need at least {required} candles, got {actual}")]
    InsufficientData {
        symbol: String,
        required: usize,
        actual: usize,
    },

    #[error("Candles for {0} are not strictly increasing by open time")]
    UnorderedSeries(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart error: {0}")]
    Chart(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl BotError {
    /// Errors caused by the market-data side (as opposed to delivery or local setup)
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            BotError::Http(_)
                | BotError::Timeout { .. }
                | BotError::Api { .. }
                | BotError::Json(_)
                | BotError::MalformedKline(_)
                | BotError::InsufficientData { .. }
                | BotError::UnorderedSeries(_)
        )
    }
}
