//! Local fallback recommendations.
//!
//! When every AI provider fails, the caller falls back to counting
//! bullish/bearish indicator actions: majority rules, ties resolve to Hold.
//! Output is tagged `local-fallback` so it is never mistaken for AI output.

use crate::types::{
    AdlTrend, AiAction, AiRecommendation, IndicatorSnapshot, RecommendationSource, SentimentLabel,
    SentimentReport, TimeframeBias, TrendDirection,
};

/// ATR multiple for the fallback stop-loss distance.
const FALLBACK_STOP_ATR: f64 = 1.5;
/// ATR multiple for the fallback target distance.
const FALLBACK_TARGET_ATR: f64 = 2.0;

/// Count bullish and bearish indicator actions.
/// Votes: trend direction, RSI versus 50, ADL trend, and each timeframe
/// reading. Sideways trend and RSI exactly at 50 abstain.
pub fn count_votes(snapshot: &IndicatorSnapshot) -> (u32, u32) {
    let mut bullish = 0;
    let mut bearish = 0;

    match snapshot.trend {
        TrendDirection::Uptrend => bullish += 1,
        TrendDirection::Downtrend => bearish += 1,
        TrendDirection::Sideways => {}
    }

    if snapshot.rsi > 50.0 {
        bullish += 1;
    } else if snapshot.rsi < 50.0 {
        bearish += 1;
    }

    match snapshot.adl_trend {
        AdlTrend::Uptrend => bullish += 1,
        AdlTrend::Downtrend => bearish += 1,
    }

    for bias in snapshot.multi_timeframe_confluence.values() {
        match bias {
            TimeframeBias::Bullish => bullish += 1,
            TimeframeBias::Bearish => bearish += 1,
        }
    }

    (bullish, bearish)
}

/// Majority-rule recommendation over the supplied indicators.
pub fn local_recommendation(
    snapshot: &IndicatorSnapshot,
    current_price: f64,
) -> AiRecommendation {
    let (bullish, bearish) = count_votes(snapshot);
    let total = bullish + bearish;

    let action = if bullish > bearish {
        AiAction::Buy
    } else if bearish > bullish {
        AiAction::Sell
    } else {
        AiAction::Hold
    };

    let confidence = if total > 0 {
        bullish.max(bearish) as f64 / total as f64
    } else {
        0.5
    };

    let stop_distance = snapshot.atr * FALLBACK_STOP_ATR;
    let target_distance = snapshot.atr * FALLBACK_TARGET_ATR;

    let (target_price, stop_loss) = match action {
        AiAction::Sell => (current_price - target_distance, current_price + stop_distance),
        _ => (current_price + target_distance, current_price - stop_distance),
    };

    let expected_gain_pct = if current_price > 0.0 {
        match action {
            AiAction::Sell => (current_price - target_price) / current_price * 100.0,
            _ => (target_price - current_price) / current_price * 100.0,
        }
    } else {
        0.0
    };

    AiRecommendation {
        action,
        confidence,
        entry_price: current_price,
        target_price,
        stop_loss,
        expected_gain_pct,
        analysis: format!(
            "Local indicator vote: {} bullish vs {} bearish",
            bullish, bearish
        ),
        source: RecommendationSource::LocalFallback,
    }
}

/// Majority-rule sentiment. Without a snapshot the reading is neutral.
pub fn local_sentiment(ticker: &str, snapshot: Option<&IndicatorSnapshot>) -> SentimentReport {
    let (sentiment, confidence, analysis) = match snapshot {
        Some(snapshot) => {
            let (bullish, bearish) = count_votes(snapshot);
            let total = bullish + bearish;
            let sentiment = if bullish > bearish {
                SentimentLabel::Bullish
            } else if bearish > bullish {
                SentimentLabel::Bearish
            } else {
                SentimentLabel::Neutral
            };
            let confidence = if total > 0 {
                bullish.max(bearish) as f64 / total as f64
            } else {
                0.5
            };
            (
                sentiment,
                confidence,
                format!(
                    "Local indicator vote: {} bullish vs {} bearish",
                    bullish, bearish
                ),
            )
        }
        None => (
            SentimentLabel::Neutral,
            0.5,
            "No indicator history available for a local reading".to_string(),
        ),
    };

    SentimentReport {
        ticker: ticker.to_uppercase(),
        sentiment,
        confidence,
        analysis,
        source: RecommendationSource::LocalFallback,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}
