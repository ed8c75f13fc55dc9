//! Technical-analysis enrichment endpoint.
//!
//! Takes caller-supplied indicator readings and returns an AI recommendation,
//! falling back to the local majority-rule computation (tagged
//! `local-fallback`) on any provider failure.

use crate::ai::fallback;
use crate::error::{AppError, Result};
use crate::types::{AiRecommendation, IndicatorSnapshot};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::warn;

/// Request body for technical analysis.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalRequest {
    pub ticker: String,
    pub current_price: f64,
    pub indicators: IndicatorSnapshot,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/technical-analysis", post(technical_analysis))
}

/// POST /api/technical-analysis
async fn technical_analysis(
    State(state): State<AppState>,
    Json(request): Json<TechnicalRequest>,
) -> Result<Json<AiRecommendation>> {
    if request.ticker.trim().is_empty() {
        return Err(AppError::InvalidInput("ticker must not be empty".to_string()));
    }
    if !request.current_price.is_finite() || request.current_price <= 0.0 {
        return Err(AppError::InvalidInput(
            "currentPrice must be positive".to_string(),
        ));
    }

    let recommendation = match state
        .ai_chain
        .analyze_indicators(&request.ticker, &request.indicators, request.current_price)
        .await
    {
        Ok(recommendation) => recommendation,
        Err(err) => {
            warn!(
                "Technical analysis providers failed for {}: {} - using local fallback",
                request.ticker, err
            );
            fallback::local_recommendation(&request.indicators, request.current_price)
        }
    };

    Ok(Json(recommendation))
}
