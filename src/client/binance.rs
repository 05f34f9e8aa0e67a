//! Binance klines client
//!
//! `GET /api/v3/klines` returns an array of arrays shaped
//! `[openTimeMs, open, high, low, close, volume, closeTime, ...]` where the
//! price fields are JSON strings.

use super::MarketData;
use crate::analysis::MIN_CANDLES;
use crate::config::MarketConfig;
use crate::error::{BotError, Result};
use crate::types::{Candle, Series};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Binance public market data client
#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
    interval: String,
}

impl BinanceClient {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            interval: config.interval.clone(),
        })
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    async fn fetch(&self, symbol: &str, lookback: u32) -> Result<Series> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = lookback.to_string();

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", self.interval.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let series = parse_klines(symbol, &body)?;

        if series.len() < MIN_CANDLES {
            return Err(BotError::InsufficientData {
                symbol: symbol.to_string(),
                required: MIN_CANDLES,
                actual: series.len(),
            });
        }

        debug!("Fetched {} {} candles for {}", series.len(), self.interval, symbol);
        Ok(series)
    }

    fn name(&self) -> &str {
        "Binance"
    }
}

/// Parse a klines response body into a series
pub fn parse_klines(symbol: &str, body: &str) -> Result<Series> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;

    let candles = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_row(row).map_err(|e| BotError::MalformedKline(format!("row {}: {}", i, e))))
        .collect::<Result<Vec<_>>>()?;

    Series::new(symbol, candles)
}

fn parse_row(row: &[Value]) -> std::result::Result<Candle, String> {
    if row.len() < 5 {
        return Err(format!("expected at least 5 fields, got {}", row.len()));
    }

    let open_time = match &row[0] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("invalid open time {}", row[0]))?;

    let timestamp = DateTime::from_timestamp_millis(open_time)
        .ok_or_else(|| format!("open time {} out of range", open_time))?;

    Ok(Candle {
        timestamp,
        open: price(&row[1], "open")?,
        high: price(&row[2], "high")?,
        low: price(&row[3], "low")?,
        close: price(&row[4], "close")?,
    })
}

/// Prices arrive as strings from Binance; numbers are accepted too
fn price(value: &Value, field: &str) -> std::result::Result<f64, String> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match parsed {
        Some(p) if p.is_finite() => Ok(p),
        _ => Err(format!("invalid {} price {}", field, value)),
    }
}
