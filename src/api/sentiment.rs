//! Sentiment endpoint.
//!
//! Provider rate limits pass through as 429. Any other provider failure
//! returns 500 with the local-fallback reading as the body, clearly tagged
//! `local-fallback`.

use crate::ai::{fallback, ProviderError};
use crate::engine::IndicatorSource;
use crate::error::AppError;
use crate::types::{IndicatorSnapshot, StrategyProfile};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

/// Request body for sentiment analysis.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentRequest {
    pub ticker: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/sentiment", post(sentiment))
}

/// POST /api/sentiment
async fn sentiment(
    State(state): State<AppState>,
    Json(request): Json<SentimentRequest>,
) -> Response {
    if request.ticker.trim().is_empty() {
        return AppError::InvalidInput("ticker must not be empty".to_string()).into_response();
    }

    match state.ai_chain.analyze_sentiment(&request.ticker).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(ProviderError::RateLimited) => {
            AppError::RateLimited("ai provider".to_string()).into_response()
        }
        Err(err) => {
            warn!(
                "Sentiment providers failed for {}: {} - returning local fallback",
                request.ticker, err
            );
            let snapshot = best_effort_snapshot(&state, &request.ticker).await;
            let report = fallback::local_sentiment(&request.ticker, snapshot.as_ref());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(report)).into_response()
        }
    }
}

/// Try to derive an indicator snapshot for the fallback reading. Failures
/// are swallowed: the fallback degrades to a neutral report.
async fn best_effort_snapshot(state: &AppState, ticker: &str) -> Option<IndicatorSnapshot> {
    let profile = StrategyProfile::short_term();
    state
        .market_data
        .ensure_history(ticker, &profile.timeframes)
        .await
        .ok()?;
    state
        .indicator_source
        .snapshot(ticker, &profile)
        .await
        .ok()
}
