use serde::{Deserialize, Serialize};

/// Discrete trading signal derived from the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSignal {
    Buy,
    Sell,
    Neutral,
}

/// Buy threshold on the weighted score (strict).
pub const BUY_THRESHOLD: f64 = 0.1;
/// Sell threshold on the weighted score (strict).
pub const SELL_THRESHOLD: f64 = -0.1;

impl TradeSignal {
    /// Classify a weighted score. Strict comparisons: a score of exactly
    /// 0.1 or -0.1 stays Neutral.
    pub fn from_score(score: f64) -> Self {
        if score > BUY_THRESHOLD {
            TradeSignal::Buy
        } else if score < SELL_THRESHOLD {
            TradeSignal::Sell
        } else {
            TradeSignal::Neutral
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TradeSignal::Buy => "Buy",
            TradeSignal::Sell => "Sell",
            TradeSignal::Neutral => "Neutral",
        }
    }
}

/// Recommendation action from the AI collaborator or local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiAction {
    Buy,
    Sell,
    Hold,
}

/// Where a recommendation or sentiment reading came from. Local fallback
/// output must never be presented as AI-sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationSource {
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "local-fallback")]
    LocalFallback,
}

/// Recommendation enrichment for an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecommendation {
    pub action: AiAction,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    /// Percent gain from entry to target, sign-adjusted for direction.
    pub expected_gain_pct: f64,
    pub analysis: String,
    pub source: RecommendationSource,
}

/// Market sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

/// Sentiment reading for a ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentReport {
    pub ticker: String,
    pub sentiment: SentimentLabel,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub analysis: String,
    pub source: RecommendationSource,
    /// Unix timestamp (milliseconds).
    pub timestamp: i64,
}

/// The unit returned to callers and optionally persisted to a saved list.
/// Immutable once created; destroyed only by explicit deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Composed from ticker + timestamp. Uniqueness is list-display grade,
    /// not cryptographic.
    pub id: String,
    /// Uppercase symbol.
    pub ticker: String,
    pub strategy_name: String,
    /// Normalized combination of indicator components, practically in [-1, 1].
    pub weighted_score: f64,
    pub signal: TradeSignal,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Entry reference price.
    pub last_close: f64,
    /// Percent distance from entry to target, sign-adjusted for direction.
    pub expected_gain_pct: f64,
    /// Fraction of account equity sized so a stop-out loses riskPerTrade.
    pub position_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_recommendation: Option<AiRecommendation>,
    /// Unix timestamp (milliseconds) of creation.
    pub timestamp: i64,
}

impl AnalysisResult {
    /// Build the list id for a ticker at a creation instant.
    pub fn make_id(ticker: &str, timestamp: i64) -> String {
        format!("{}-{}", ticker.to_uppercase(), timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_thresholds_strict() {
        // Exactly at the threshold stays Neutral.
        assert_eq!(TradeSignal::from_score(0.1), TradeSignal::Neutral);
        assert_eq!(TradeSignal::from_score(-0.1), TradeSignal::Neutral);

        // Just past the threshold flips.
        assert_eq!(TradeSignal::from_score(0.1000001), TradeSignal::Buy);
        assert_eq!(TradeSignal::from_score(-0.1000001), TradeSignal::Sell);
    }

    #[test]
    fn test_signal_extremes() {
        assert_eq!(TradeSignal::from_score(1.0), TradeSignal::Buy);
        assert_eq!(TradeSignal::from_score(-1.0), TradeSignal::Sell);
        assert_eq!(TradeSignal::from_score(0.0), TradeSignal::Neutral);
    }

    #[test]
    fn test_source_wire_format() {
        assert_eq!(
            serde_json::to_string(&RecommendationSource::LocalFallback).unwrap(),
            "\"local-fallback\""
        );
        assert_eq!(
            serde_json::to_string(&RecommendationSource::Ai).unwrap(),
            "\"ai\""
        );
    }

    #[test]
    fn test_make_id_uppercases_ticker() {
        assert_eq!(AnalysisResult::make_id("aapl", 1700000000000), "AAPL-1700000000000");
    }

    #[test]
    fn test_result_serde_skips_missing_recommendation() {
        let result = AnalysisResult {
            id: AnalysisResult::make_id("TSLA", 1700000000000),
            ticker: "TSLA".to_string(),
            strategy_name: "short-term".to_string(),
            weighted_score: 0.42,
            signal: TradeSignal::Buy,
            stop_loss: 238.5,
            take_profit: 252.0,
            last_close: 245.0,
            expected_gain_pct: 2.86,
            position_size: 0.35,
            ai_recommendation: None,
            timestamp: 1700000000000,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("aiRecommendation"));
        assert!(json.contains("\"weightedScore\":0.42"));

        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.signal, TradeSignal::Buy);
        assert_eq!(back.id, "TSLA-1700000000000");
    }
}
