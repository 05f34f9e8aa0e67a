//! Candle analysis
//!
//! Derives a short-term directional bias from the last completed daily
//! candle and the close before it.

pub mod bias;


pub use bias::{classify, classify_candles, MIN_CANDLES, WICK_RATIO};
