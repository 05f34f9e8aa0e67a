//! Core types shared across the bot

use crate::error::{BotError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One daily OHLC bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time of the bar
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Candles for one symbol, oldest first, strictly increasing by open time
#[derive(Debug, Clone)]
pub struct Series {
    symbol: String,
    candles: Vec<Candle>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>) -> Result<Self> {
        let symbol = symbol.into();
        if candles.windows(2).any(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(BotError::UnorderedSeries(symbol));
        }
        Ok(Self { symbol, candles })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Candle `n` positions from the end (`from_end(1)` is the last one)
    pub fn from_end(&self, n: usize) -> Option<&Candle> {
        self.candles.len().checked_sub(n).and_then(|i| self.candles.get(i))
    }

    /// Lowest low and highest high across the series
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let first = self.candles.first()?;
        Some(self.candles.iter().fold((first.low, first.high), |(lo, hi), c| {
            (lo.min(c.low), hi.max(c.high))
        }))
    }
}

/// Coarse directional label for the last completed candle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasLabel {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

impl BiasLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiasLabel::StrongBullish => "STRONG BULLISH",
            BiasLabel::Bullish => "BULLISH",
            BiasLabel::Neutral => "NEUTRAL",
            BiasLabel::Bearish => "BEARISH",
            BiasLabel::StrongBearish => "STRONG BEARISH",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            BiasLabel::StrongBullish => "🟢🟢",
            BiasLabel::Bullish => "🟢",
            BiasLabel::Neutral => "⚪",
            BiasLabel::Bearish => "🔴",
            BiasLabel::StrongBearish => "🔴🔴",
        }
    }
}

impl fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification outcome with the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasResult {
    pub label: BiasLabel,
    pub reason: &'static str,
    pub inputs: BiasInputs,
}

/// Prices read from the last completed candle (C1/O1/H1/L1) and the one before it (C2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiasInputs {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub prior_close: f64,
}
