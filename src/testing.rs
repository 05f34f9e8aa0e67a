//! Test doubles for the market data and chat seams

use crate::client::MarketData;
use crate::error::{BotError, Result};
use crate::notify::{ChatSink, Embed, OutboundMessage};
use crate::types::{Candle, Series};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Daily series starting 2025-01-01 from (open, high, low, close) tuples
pub fn daily_series(symbol: &str, bars: &[(f64, f64, f64, f64)]) -> Series {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let candles = bars
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Candle {
            timestamp: start + Duration::days(i as i64),
            open,
            high,
            low,
            close,
        })
        .collect();
    Series::new(symbol, candles).unwrap()
}

/// Three candles whose middle one classifies as strong bullish
pub fn strong_bullish_series(symbol: &str) -> Series {
    daily_series(
        symbol,
        &[
            (104.0, 106.0, 98.0, 105.0),
            (100.0, 112.0, 95.0, 110.0),
            (110.0, 111.0, 108.0, 109.0),
        ],
    )
}

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Series(Series),
    /// Fail with `MalformedKline`
    Fail(String),
    /// Never answer within a test's timeout
    Hang,
}

/// Market data source answering from a fixed table
#[derive(Debug, Default)]
pub struct FakeMarketData {
    responses: HashMap<String, FakeResponse>,
    calls: AtomicUsize,
}

impl FakeMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, response: FakeResponse) -> Self {
        self.responses.insert(symbol.to_string(), response);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketData for FakeMarketData {
    async fn fetch(&self, symbol: &str, _lookback: u32) -> Result<Series> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(symbol) {
            Some(FakeResponse::Series(series)) => Ok(series.clone()),
            Some(FakeResponse::Fail(msg)) => Err(BotError::MalformedKline(msg.clone())),
            Some(FakeResponse::Hang) => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Err(BotError::MalformedKline("unreachable".into()))
            }
            None => Err(BotError::Api {
                status: 400,
                body: "Invalid symbol.".into(),
            }),
        }
    }

    fn name(&self) -> &str {
        "Fake"
    }
}

/// Chat sink that records everything it is asked to send
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSink {
    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.sent.lock().await.push(OutboundMessage::Text(text.to_string()));
        Ok(())
    }

    async fn send_file(&self, path: &Path, caption: Option<String>) -> Result<()> {
        self.sent.lock().await.push(OutboundMessage::File {
            path: path.to_path_buf(),
            caption,
        });
        Ok(())
    }

    async fn send_embed(&self, embed: &Embed) -> Result<()> {
        self.sent.lock().await.push(OutboundMessage::Embed(embed.clone()));
        Ok(())
    }
}
