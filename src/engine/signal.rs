//! Signal engine: reduces an indicator snapshot to a discrete trading signal
//! with exit levels and a position size.

use crate::engine::indicators::IndicatorSource;
use crate::error::{AppError, Result};
use crate::types::{
    AdlTrend, AnalysisResult, IndicatorSnapshot, StrategyProfile, TimeframeBias, TradeSignal,
    TrendDirection,
};
use std::sync::Arc;
use tracing::debug;

/// Component weights for the weighted score. Sum to 1.0 so the score stays
/// in [-1, 1].
const WEIGHT_TREND: f64 = 0.30;
const WEIGHT_RSI: f64 = 0.20;
const WEIGHT_ADL: f64 = 0.15;
const WEIGHT_MTFC: f64 = 0.35;

/// Signal engine over an injected indicator source.
pub struct SignalEngine {
    indicators: Arc<dyn IndicatorSource>,
}

impl SignalEngine {
    pub fn new(indicators: Arc<dyn IndicatorSource>) -> Self {
        Self { indicators }
    }

    /// Analyze a ticker: derive an indicator snapshot and reduce it to an
    /// [`AnalysisResult`]. Fails with `DataUnavailable` when the upstream
    /// source cannot produce a snapshot; a result is never fabricated.
    pub async fn analyze(
        &self,
        ticker: &str,
        current_price: f64,
        profile: &StrategyProfile,
    ) -> Result<AnalysisResult> {
        self.analyze_detailed(ticker, current_price, profile)
            .await
            .map(|(result, _)| result)
    }

    /// Like [`analyze`](Self::analyze), also returning the snapshot the
    /// result was reduced from (for enrichment and fallback computation).
    pub async fn analyze_detailed(
        &self,
        ticker: &str,
        current_price: f64,
        profile: &StrategyProfile,
    ) -> Result<(AnalysisResult, IndicatorSnapshot)> {
        if ticker.trim().is_empty() {
            return Err(AppError::InvalidInput("ticker must not be empty".to_string()));
        }
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(AppError::InvalidInput(
                "currentPrice must be positive".to_string(),
            ));
        }
        profile.validate()?;

        let snapshot = self.indicators.snapshot(ticker, profile).await?;
        let timestamp = chrono::Utc::now().timestamp_millis();
        let result = reduce(ticker, current_price, profile, &snapshot, timestamp);

        Ok((result, snapshot))
    }
}

/// Multi-timeframe confluence score: bullish-weight sum minus bearish-weight
/// sum, normalized to [-1, 1] by the total weight.
pub fn confluence_score(profile: &StrategyProfile, snapshot: &IndicatorSnapshot) -> f64 {
    let mut total = 0.0;
    let mut net = 0.0;

    for tf in &profile.timeframes {
        let weight = profile.mtf_weights.get(tf).copied().unwrap_or(0.0);
        total += weight;
        match snapshot.multi_timeframe_confluence.get(tf) {
            Some(TimeframeBias::Bullish) => net += weight,
            Some(TimeframeBias::Bearish) => net -= weight,
            None => {}
        }
    }

    if total > 0.0 {
        net / total
    } else {
        0.0
    }
}

/// Reduce a snapshot to an analysis result. Pure: identical inputs always
/// produce identical signal, exits, and expected gain.
pub fn reduce(
    ticker: &str,
    current_price: f64,
    profile: &StrategyProfile,
    snapshot: &IndicatorSnapshot,
    timestamp: i64,
) -> AnalysisResult {
    let trend_component = match snapshot.trend {
        TrendDirection::Uptrend => 1.0,
        TrendDirection::Downtrend => -1.0,
        TrendDirection::Sideways => 0.0,
    };

    let rsi_component = ((snapshot.rsi - 50.0) / 50.0).clamp(-1.0, 1.0);

    let adl_component = match snapshot.adl_trend {
        AdlTrend::Uptrend => 1.0,
        AdlTrend::Downtrend => -1.0,
    };

    let mtfc_component = confluence_score(profile, snapshot);

    let weighted_score = WEIGHT_TREND * trend_component
        + WEIGHT_RSI * rsi_component
        + WEIGHT_ADL * adl_component
        + WEIGHT_MTFC * mtfc_component;

    let signal = TradeSignal::from_score(weighted_score);

    let stop_distance = snapshot.atr * profile.stop_loss_multiplier();
    let target_distance = snapshot.atr * profile.take_profit_multiplier();

    // Sell mirrors Buy; a Neutral result keeps Buy-side level placement.
    let (stop_loss, take_profit) = match signal {
        TradeSignal::Sell => (current_price + stop_distance, current_price - target_distance),
        _ => (current_price - stop_distance, current_price + target_distance),
    };

    let expected_gain_pct = match signal {
        TradeSignal::Sell => (current_price - take_profit) / current_price * 100.0,
        _ => (take_profit - current_price) / current_price * 100.0,
    };

    let position_size = if stop_distance > 0.0 {
        (profile.risk_per_trade * current_price / stop_distance * profile.position_size_factor)
            .min(1.0)
    } else {
        0.0
    };

    debug!(
        "Reduced {} [{}]: score {:.4} -> {:?}",
        ticker,
        profile.name,
        weighted_score,
        signal
    );

    AnalysisResult {
        id: AnalysisResult::make_id(ticker, timestamp),
        ticker: ticker.to_uppercase(),
        strategy_name: profile.name.clone(),
        weighted_score,
        signal,
        stop_loss,
        take_profit,
        last_close: current_price,
        expected_gain_pct,
        position_size,
        ai_recommendation: None,
        timestamp,
    }
}
