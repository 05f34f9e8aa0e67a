//! Market data clients

pub mod binance;

pub use binance::{parse_klines, BinanceClient};

use crate::error::Result;
use crate::types::Series;
use async_trait::async_trait;

/// Source of daily candles for a symbol
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch the most recent `lookback` candles, oldest first
    async fn fetch(&self, symbol: &str, lookback: u32) -> Result<Series>;

    /// Source name for logs and report footers
    fn name(&self) -> &str;
}
