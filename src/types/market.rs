use serde::{Deserialize, Serialize};

/// A single OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcCandle {
    /// Unix timestamp (milliseconds) of the candle open.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Current quote for a ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerQuote {
    /// Uppercase symbol.
    pub ticker: String,
    /// Last traded price.
    pub price: f64,
    /// Absolute change versus previous close.
    pub change: f64,
    /// Percent change versus previous close.
    pub change_percent: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Session volume.
    pub volume: f64,
    /// Unix timestamp (milliseconds) when fetched.
    pub timestamp: i64,
}
