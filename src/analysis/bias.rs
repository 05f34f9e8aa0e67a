//! Bias classification rule
//!
//! The last candle of a fetched series is the one still forming, so the
//! rule reads the candle before it (C1/O1/H1/L1) and the close of the one
//! before that (C2). Guards are evaluated top to bottom; the first match wins.

use crate::error::{BotError, Result};
use crate::types::{BiasInputs, BiasLabel, BiasResult, Candle, Series};

/// Candles needed to read C1 and C2 while skipping the forming candle
pub const MIN_CANDLES: usize = 3;

/// Maximum wick-to-body ratio for a "strong" close
pub const WICK_RATIO: f64 = 0.4;

const STRONG_BULLISH_REASON: &str =
    "Strong close near the high, breaking above previous structure.";
const BULLISH_REASON: &str = "Closed above previous close and above the open.";
const STRONG_BEARISH_REASON: &str = "Closed weak near the low and below previous close.";
const BEARISH_REASON: &str = "Closed below both the open and previous close.";
const NEUTRAL_REASON: &str = "Indecisive structure with no clear directional pressure.";

/// Classify a fetched series
pub fn classify(series: &Series) -> Result<BiasResult> {
    let insufficient = || BotError::InsufficientData {
        symbol: series.symbol().to_string(),
        required: MIN_CANDLES,
        actual: series.len(),
    };

    if series.len() < MIN_CANDLES {
        return Err(insufficient());
    }

    let last_closed = series.from_end(2).ok_or_else(insufficient)?;
    let prior = series.from_end(3).ok_or_else(insufficient)?;

    Ok(classify_candles(last_closed, prior.close))
}

/// Apply the rule to a completed candle and the close before it
pub fn classify_candles(candle: &Candle, prior_close: f64) -> BiasResult {
    let inputs = BiasInputs {
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
        prior_close,
    };
    let (label, reason) = decide(&inputs);
    BiasResult {
        label,
        reason,
        inputs,
    }
}

fn decide(i: &BiasInputs) -> (BiasLabel, &'static str) {
    let (c1, o1, h1, l1, c2) = (i.close, i.open, i.high, i.low, i.prior_close);

    // No epsilon: plain f64 comparisons
    if c1 > o1 && c1 > c2 && (h1 - c1) < (c1 - l1) * WICK_RATIO {
        (BiasLabel::StrongBullish, STRONG_BULLISH_REASON)
    } else if c1 > o1 && c1 >= c2 {
        (BiasLabel::Bullish, BULLISH_REASON)
    } else if c1 < o1 && c1 < c2 && (c1 - l1) < (h1 - c1) * WICK_RATIO {
        (BiasLabel::StrongBearish, STRONG_BEARISH_REASON)
    } else if c1 < o1 && c1 <= c2 {
        (BiasLabel::Bearish, BEARISH_REASON)
    } else {
        (BiasLabel::Neutral, NEUTRAL_REASON)
    }
}
