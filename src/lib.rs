//! Daily Bias Bot
//!
//! Posts a daily directional bias for a list of crypto assets to a Discord
//! channel, derived from the last completed 1d candle on Binance.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler (startup / every 24h / daily at HH:MM UTC)
//!     → MarketData (Binance klines) → Analysis (bias rules)
//!     → Chart (PNG, text format only) → Report (text | embed) → ChatSink (Discord)
//! ```

pub mod analysis;
pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod report;
pub mod scheduler;
pub mod types;

#[cfg(test)]
pub mod testing;
