//! Technical indicator computation over OHLCV history.
//!
//! The [`IndicatorSource`] seam is the injectable boundary between the signal
//! reduction and whatever supplies price history: the engine never fabricates
//! readings when data is missing.

use crate::error::{AppError, Result};
use crate::services::CandleStore;
use crate::types::{
    AdlTrend, IndicatorSnapshot, OhlcCandle, StrategyProfile, TimeframeBias, TrendDirection,
    VolumeCategory,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// EMA separation below which the trend is classified Sideways (fraction).
const SIDEWAYS_BAND: f64 = 0.0025;

/// Lookback used for the average-volume baseline.
const VOLUME_LOOKBACK: usize = 20;

/// Produces an [`IndicatorSnapshot`] for a ticker from raw OHLCV history.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Derive a snapshot for the ticker under the given profile.
    /// Fails with `DataUnavailable` when history is missing or insufficient.
    async fn snapshot(&self, ticker: &str, profile: &StrategyProfile)
        -> Result<IndicatorSnapshot>;
}

/// Calculate an exponential moving average over closing prices.
/// First EMA is seeded with the SMA of the initial period.
pub fn ema(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let sma: f64 = closes.iter().take(period).sum::<f64>() / period as f64;

    let mut ema = sma;
    for close in closes.iter().skip(period) {
        ema = (close - ema) * multiplier + ema;
    }

    Some(ema)
}

/// Calculate RSI with Wilder smoothing. Returns a value in [0, 100].
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::new();
    let mut losses = Vec::new();

    for window in closes.windows(2) {
        let change = window[1] - window[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// True range of a candle against the previous close.
fn true_range(current: &OhlcCandle, previous: &OhlcCandle) -> f64 {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

/// Calculate ATR with Wilder smoothing. Always >= 0.
pub fn atr(candles: &[OhlcCandle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let mut true_ranges = Vec::new();
    for i in 1..candles.len() {
        true_ranges.push(true_range(&candles[i], &candles[i - 1]));
    }

    let mut atr: f64 = true_ranges.iter().take(period).sum::<f64>() / period as f64;
    for tr in true_ranges.iter().skip(period) {
        atr = (atr * (period - 1) as f64 + tr) / period as f64;
    }

    Some(atr)
}

/// Accumulation/distribution line: cumulative money-flow volume.
pub fn adl_series(candles: &[OhlcCandle]) -> Vec<f64> {
    let mut series = Vec::with_capacity(candles.len());
    let mut running = 0.0;

    for candle in candles {
        let range = candle.high - candle.low;
        let mfm = if range > 0.0 {
            ((candle.close - candle.low) - (candle.high - candle.close)) / range
        } else {
            0.0
        };
        running += mfm * candle.volume;
        series.push(running);
    }

    series
}

/// Classify trend from the EMA pair separation.
pub fn classify_trend(ema_short: f64, ema_long: f64) -> TrendDirection {
    if ema_long <= 0.0 {
        return TrendDirection::Sideways;
    }

    let separation = (ema_short - ema_long) / ema_long;
    if separation > SIDEWAYS_BAND {
        TrendDirection::Uptrend
    } else if separation < -SIDEWAYS_BAND {
        TrendDirection::Downtrend
    } else {
        TrendDirection::Sideways
    }
}

/// Classify the latest volume against the lookback average.
pub fn classify_volume(candles: &[OhlcCandle]) -> (f64, VolumeCategory) {
    let last = candles.last().map(|c| c.volume).unwrap_or(0.0);
    let lookback = candles.len().min(VOLUME_LOOKBACK);
    if lookback == 0 {
        return (last, VolumeCategory::Low);
    }

    let avg: f64 = candles
        .iter()
        .rev()
        .take(lookback)
        .map(|c| c.volume)
        .sum::<f64>()
        / lookback as f64;

    let category = if last >= avg {
        VolumeCategory::High
    } else {
        VolumeCategory::Low
    };
    (last, category)
}

/// Classify the accumulation/distribution trend over the lookback window.
pub fn classify_adl(candles: &[OhlcCandle], lookback: usize) -> AdlTrend {
    let series = adl_series(candles);
    let last = series.last().copied().unwrap_or(0.0);
    let reference = if series.len() > lookback {
        series[series.len() - 1 - lookback]
    } else {
        series.first().copied().unwrap_or(0.0)
    };

    if last >= reference {
        AdlTrend::Uptrend
    } else {
        AdlTrend::Downtrend
    }
}

/// Indicator source backed by an in-process candle store.
///
/// RSI, ATR, EMA, volume, and ADL readings are computed on the profile's
/// highest timeframe; the confluence map carries an EMA-pair reading for every
/// timeframe the profile names.
pub struct CandleIndicatorSource {
    candles: Arc<CandleStore>,
}

impl CandleIndicatorSource {
    pub fn new(candles: Arc<CandleStore>) -> Self {
        Self { candles }
    }

    /// Minimum candle count needed for the primary-timeframe indicators.
    fn min_candles(profile: &StrategyProfile) -> usize {
        profile
            .ema_windows
            .1
            .max(profile.rsi_window + 1)
            .max(profile.atr_window + 1)
    }

    /// EMA-pair reading for one timeframe's series.
    fn timeframe_bias(series: &[OhlcCandle], windows: (usize, usize)) -> Option<TimeframeBias> {
        let closes: Vec<f64> = series.iter().map(|c| c.close).collect();
        let fast = ema(&closes, windows.0)?;
        let slow = ema(&closes, windows.1)?;

        Some(if fast >= slow {
            TimeframeBias::Bullish
        } else {
            TimeframeBias::Bearish
        })
    }
}

#[async_trait]
impl IndicatorSource for CandleIndicatorSource {
    async fn snapshot(
        &self,
        ticker: &str,
        profile: &StrategyProfile,
    ) -> Result<IndicatorSnapshot> {
        let primary_tf = profile.timeframes.last().ok_or_else(|| {
            AppError::InvalidInput(format!("strategy '{}' has no timeframes", profile.name))
        })?;

        let candles = self.candles.series(ticker, primary_tf).ok_or_else(|| {
            AppError::DataUnavailable(format!("no {} history for {}", primary_tf, ticker))
        })?;

        if candles.len() < Self::min_candles(profile) {
            return Err(AppError::DataUnavailable(format!(
                "insufficient {} history for {}: {} candles",
                primary_tf,
                ticker,
                candles.len()
            )));
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let ema_short = ema(&closes, profile.ema_windows.0).ok_or_else(|| {
            AppError::DataUnavailable(format!("cannot compute fast EMA for {}", ticker))
        })?;
        let ema_long = ema(&closes, profile.ema_windows.1).ok_or_else(|| {
            AppError::DataUnavailable(format!("cannot compute slow EMA for {}", ticker))
        })?;
        let rsi_value = rsi(&closes, profile.rsi_window).ok_or_else(|| {
            AppError::DataUnavailable(format!("cannot compute RSI for {}", ticker))
        })?;
        let atr_value = atr(&candles, profile.atr_window).ok_or_else(|| {
            AppError::DataUnavailable(format!("cannot compute ATR for {}", ticker))
        })?;

        let trend = classify_trend(ema_short, ema_long);
        let (volume, volume_category) = classify_volume(&candles);
        let adl_trend = classify_adl(&candles, profile.atr_window);

        let mut confluence = HashMap::new();
        for tf in &profile.timeframes {
            let series = self.candles.series(ticker, tf).ok_or_else(|| {
                AppError::DataUnavailable(format!("no {} history for {}", tf, ticker))
            })?;

            let bias = Self::timeframe_bias(&series, profile.ema_windows).ok_or_else(|| {
                AppError::DataUnavailable(format!(
                    "insufficient {} history for {} confluence",
                    tf, ticker
                ))
            })?;
            confluence.insert(tf.clone(), bias);
        }

        debug!(
            "Computed snapshot for {}: trend {:?}, rsi {:.1}, atr {:.4}",
            ticker, trend, rsi_value, atr_value
        );

        Ok(IndicatorSnapshot {
            ema_short,
            ema_long,
            rsi: rsi_value,
            atr: atr_value,
            trend,
            volume,
            volume_category,
            adl_trend,
            multi_timeframe_confluence: confluence,
        })
    }
}
