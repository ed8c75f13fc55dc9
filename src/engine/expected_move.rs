//! Expected-move (volatility range) calculator.
//!
//! Pure and deterministic: identical inputs always yield identical outputs.
//! The probability tiers are the standard one/two-sigma framing, asserted as
//! constants rather than computed from a distribution.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calculator errors.
#[derive(Debug, Error)]
pub enum ExpectedMoveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ExpectedMoveError> for AppError {
    fn from(err: ExpectedMoveError) -> Self {
        match err {
            ExpectedMoveError::InvalidInput(msg) => AppError::InvalidInput(msg),
        }
    }
}

/// Probability of the price staying within one expected move.
pub const ONE_SIGMA_PCT: f64 = 68.0;
/// Probability of the price staying within two expected moves.
pub const TWO_SIGMA_PCT: f64 = 95.0;
/// Probability of the price moving beyond two expected moves.
pub const TAIL_PCT: f64 = 5.0;

/// Result of an expected-move computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedMoveResult {
    pub price: f64,
    pub implied_volatility_pct: f64,
    pub days_to_horizon: u32,
    /// `price * (vol/100) * sqrt(days/365)`.
    pub expected_move: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub one_sigma_pct: f64,
    pub two_sigma_pct: f64,
    pub tail_pct: f64,
}

/// Symmetric volatility-band calculator.
pub struct ExpectedMoveCalculator;

impl ExpectedMoveCalculator {
    /// Compute the expected move for a price, implied volatility percentage,
    /// and horizon in days.
    ///
    /// Fails on `price <= 0`, volatility outside `(0, 100]`, or days outside
    /// `[1, 365]`. A zero-day horizon is rejected, not clamped.
    pub fn compute(
        price: f64,
        implied_volatility_pct: f64,
        days_to_horizon: u32,
    ) -> Result<ExpectedMoveResult, ExpectedMoveError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(ExpectedMoveError::InvalidInput(
                "price must be positive".to_string(),
            ));
        }

        if !implied_volatility_pct.is_finite()
            || implied_volatility_pct <= 0.0
            || implied_volatility_pct > 100.0
        {
            return Err(ExpectedMoveError::InvalidInput(
                "volatility must be in (0, 100]".to_string(),
            ));
        }

        if days_to_horizon < 1 || days_to_horizon > 365 {
            return Err(ExpectedMoveError::InvalidInput(
                "days must be in [1, 365]".to_string(),
            ));
        }

        let expected_move = price
            * (implied_volatility_pct / 100.0)
            * (days_to_horizon as f64 / 365.0).sqrt();

        Ok(ExpectedMoveResult {
            price,
            implied_volatility_pct,
            days_to_horizon,
            expected_move,
            lower_bound: price - expected_move,
            upper_bound: price + expected_move,
            one_sigma_pct: ONE_SIGMA_PCT,
            two_sigma_pct: TWO_SIGMA_PCT,
            tail_pct: TAIL_PCT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_formula_exactness() {
        let result = ExpectedMoveCalculator::compute(100.0, 20.0, 30).unwrap();

        let expected = 100.0 * 0.20 * (30.0_f64 / 365.0).sqrt();
        assert!((result.expected_move - expected).abs() < TOLERANCE);
        // 100 * 0.20 * sqrt(30/365) ~= 5.7339
        assert!((result.expected_move - 5.7339).abs() < 0.0001);
    }

    #[test]
    fn test_bounds_symmetric() {
        let result = ExpectedMoveCalculator::compute(250.0, 35.0, 45).unwrap();

        assert!((result.lower_bound - (250.0 - result.expected_move)).abs() < TOLERANCE);
        assert!((result.upper_bound - (250.0 + result.expected_move)).abs() < TOLERANCE);
        assert!(
            ((result.upper_bound - 250.0) - (250.0 - result.lower_bound)).abs() < TOLERANCE
        );
    }

    #[test]
    fn test_deterministic() {
        let a = ExpectedMoveCalculator::compute(42.5, 18.0, 7).unwrap();
        let b = ExpectedMoveCalculator::compute(42.5, 18.0, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_year_horizon() {
        // At 365 days the sqrt term is 1: move = price * vol fraction.
        let result = ExpectedMoveCalculator::compute(100.0, 25.0, 365).unwrap();
        assert!((result.expected_move - 25.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_one_day_horizon() {
        let result = ExpectedMoveCalculator::compute(100.0, 25.0, 1).unwrap();
        let expected = 100.0 * 0.25 * (1.0_f64 / 365.0).sqrt();
        assert!((result.expected_move - expected).abs() < TOLERANCE);
    }

    #[test]
    fn test_rejects_zero_price() {
        assert!(ExpectedMoveCalculator::compute(0.0, 20.0, 30).is_err());
    }

    #[test]
    fn test_rejects_negative_price() {
        assert!(ExpectedMoveCalculator::compute(-50.0, 20.0, 30).is_err());
    }

    #[test]
    fn test_rejects_zero_volatility() {
        assert!(ExpectedMoveCalculator::compute(100.0, 0.0, 30).is_err());
    }

    #[test]
    fn test_rejects_volatility_above_100() {
        assert!(ExpectedMoveCalculator::compute(100.0, 100.1, 30).is_err());
    }

    #[test]
    fn test_accepts_volatility_exactly_100() {
        assert!(ExpectedMoveCalculator::compute(100.0, 100.0, 30).is_ok());
    }

    #[test]
    fn test_rejects_zero_days() {
        assert!(ExpectedMoveCalculator::compute(100.0, 20.0, 0).is_err());
    }

    #[test]
    fn test_rejects_days_above_365() {
        assert!(ExpectedMoveCalculator::compute(100.0, 20.0, 366).is_err());
    }

    #[test]
    fn test_rejects_non_finite_inputs() {
        assert!(ExpectedMoveCalculator::compute(f64::NAN, 20.0, 30).is_err());
        assert!(ExpectedMoveCalculator::compute(100.0, f64::INFINITY, 30).is_err());
    }

    #[test]
    fn test_probability_tiers_fixed() {
        let result = ExpectedMoveCalculator::compute(100.0, 20.0, 30).unwrap();
        assert_eq!(result.one_sigma_pct, 68.0);
        assert_eq!(result.two_sigma_pct, 95.0);
        assert_eq!(result.tail_pct, 5.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = ExpectedMoveCalculator::compute(100.0, 20.0, 30).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"expectedMove\""));
        assert!(json.contains("\"lowerBound\""));
        assert!(json.contains("\"impliedVolatilityPct\""));
    }
}
