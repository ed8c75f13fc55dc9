use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trading strategy flavor. Exactly two variants; everything that differs
/// between them is configuration on [`StrategyProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyType {
    ShortTerm,
    LongTerm,
}

impl StrategyType {
    /// Parse from a wire key ("short-term" / "long-term").
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "short-term" | "short_term" | "short" => Some(Self::ShortTerm),
            "long-term" | "long_term" | "long" => Some(Self::LongTerm),
            _ => None,
        }
    }

    /// Storage/wire key for this strategy.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short-term",
            Self::LongTerm => "long-term",
        }
    }
}

/// Configuration profile consumed by the signal engine. Data only: the
/// reduction logic is a single free function regardless of variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyProfile {
    /// Profile identifier, copied onto every analysis result.
    pub name: String,
    /// Fast/slow EMA periods.
    pub ema_windows: (usize, usize),
    /// RSI lookback length.
    pub rsi_window: usize,
    /// ATR lookback length.
    pub atr_window: usize,
    /// Ordered timeframe labels for multi-timeframe confluence.
    pub timeframes: Vec<String>,
    /// Fraction of account risked per trade (0 < r <= 1).
    pub risk_per_trade: f64,
    /// [min, max] ATR multiplier range for stop-loss distance.
    pub stop_loss_atr_multiplier: (f64, f64),
    /// [min, max] ATR multiplier range for take-profit distance.
    pub take_profit_atr_multiplier: (f64, f64),
    /// Scalar multiplier on the computed position size.
    pub position_size_factor: f64,
    /// Timeframe label -> weight in [0, 1] for confluence scoring.
    pub mtf_weights: HashMap<String, f64>,
    /// Minimum AI confidence before an enriched recommendation is surfaced.
    pub ml_confidence_threshold: f64,
}

impl StrategyProfile {
    /// Built-in profile for a strategy type.
    pub fn for_type(strategy: StrategyType) -> Self {
        match strategy {
            StrategyType::ShortTerm => Self::short_term(),
            StrategyType::LongTerm => Self::long_term(),
        }
    }

    /// Intraday profile: tight exits, lower timeframes.
    pub fn short_term() -> Self {
        let timeframes = vec![
            "5m".to_string(),
            "15m".to_string(),
            "1h".to_string(),
            "4h".to_string(),
        ];
        let mtf_weights = HashMap::from([
            ("5m".to_string(), 0.15),
            ("15m".to_string(), 0.20),
            ("1h".to_string(), 0.30),
            ("4h".to_string(), 0.35),
        ]);

        Self {
            name: "short-term".to_string(),
            ema_windows: (9, 21),
            rsi_window: 14,
            atr_window: 14,
            timeframes,
            risk_per_trade: 0.02,
            stop_loss_atr_multiplier: (1.0, 1.5),
            take_profit_atr_multiplier: (1.5, 2.5),
            position_size_factor: 1.0,
            mtf_weights,
            ml_confidence_threshold: 0.60,
        }
    }

    /// Position profile: wider exits, daily/weekly timeframes.
    pub fn long_term() -> Self {
        let timeframes = vec!["1d".to_string(), "1wk".to_string()];
        let mtf_weights = HashMap::from([
            ("1d".to_string(), 0.55),
            ("1wk".to_string(), 0.45),
        ]);

        Self {
            name: "long-term".to_string(),
            ema_windows: (21, 50),
            rsi_window: 14,
            atr_window: 14,
            timeframes,
            risk_per_trade: 0.05,
            stop_loss_atr_multiplier: (1.5, 2.5),
            take_profit_atr_multiplier: (2.5, 4.0),
            position_size_factor: 1.5,
            mtf_weights,
            ml_confidence_threshold: 0.65,
        }
    }

    /// Validate internal consistency. Every timeframe must carry an
    /// mtf_weights entry, and fractional fields must be in range.
    pub fn validate(&self) -> Result<()> {
        for tf in &self.timeframes {
            if !self.mtf_weights.contains_key(tf) {
                return Err(AppError::InvalidInput(format!(
                    "strategy '{}': timeframe '{}' has no mtf weight",
                    self.name, tf
                )));
            }
        }

        if self.risk_per_trade <= 0.0 || self.risk_per_trade > 1.0 {
            return Err(AppError::InvalidInput(format!(
                "strategy '{}': riskPerTrade must be in (0, 1]",
                self.name
            )));
        }

        if self.ml_confidence_threshold <= 0.0 || self.ml_confidence_threshold >= 1.0 {
            return Err(AppError::InvalidInput(format!(
                "strategy '{}': mlConfidenceThreshold must be in (0, 1)",
                self.name
            )));
        }

        if self.stop_loss_atr_multiplier.0 > self.stop_loss_atr_multiplier.1
            || self.take_profit_atr_multiplier.0 > self.take_profit_atr_multiplier.1
        {
            return Err(AppError::InvalidInput(format!(
                "strategy '{}': ATR multiplier ranges must be [min, max]",
                self.name
            )));
        }

        Ok(())
    }

    /// Midpoint of the stop-loss ATR multiplier range.
    pub fn stop_loss_multiplier(&self) -> f64 {
        (self.stop_loss_atr_multiplier.0 + self.stop_loss_atr_multiplier.1) / 2.0
    }

    /// Midpoint of the take-profit ATR multiplier range.
    pub fn take_profit_multiplier(&self) -> f64 {
        (self.take_profit_atr_multiplier.0 + self.take_profit_atr_multiplier.1) / 2.0
    }
}
