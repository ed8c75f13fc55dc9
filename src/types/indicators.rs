use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
    Sideways,
}

/// Volume classification relative to the recent average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeCategory {
    High,
    Low,
}

/// Accumulation/distribution line trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdlTrend {
    Uptrend,
    Downtrend,
}

/// Bullish/bearish reading for a single timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeframeBias {
    Bullish,
    Bearish,
}

/// One full set of technical readings for a ticker. Produced per analysis
/// call; transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    /// Fast EMA price level.
    pub ema_short: f64,
    /// Slow EMA price level.
    pub ema_long: f64,
    /// RSI in [0, 100].
    pub rsi: f64,
    /// Average true range, proportional to price (>= 0).
    pub atr: f64,
    pub trend: TrendDirection,
    /// Latest observed volume.
    pub volume: f64,
    pub volume_category: VolumeCategory,
    pub adl_trend: AdlTrend,
    /// Per-timeframe bullish/bearish reading.
    pub multi_timeframe_confluence: HashMap<String, TimeframeBias>,
}
