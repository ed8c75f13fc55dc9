//! Batch analysis endpoint.

use crate::ai::fallback;
use crate::error::{AppError, Result};
use crate::types::{AnalysisResult, StrategyProfile, StrategyType};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request body for batch analysis.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub tickers: Vec<String>,
    pub strategy_type: String,
}

/// Per-ticker analysis outcome. A failed ticker carries an error message
/// instead of failing the whole batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeEntry {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub strategy: &'static str,
    pub results: Vec<AnalyzeEntry>,
    pub timestamp: i64,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}

/// POST /api/analyze
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    if request.tickers.is_empty() {
        return Err(AppError::InvalidInput("tickers must not be empty".to_string()));
    }

    let strategy = StrategyType::from_str(&request.strategy_type).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "unknown strategyType '{}'",
            request.strategy_type
        ))
    })?;
    let profile = StrategyProfile::for_type(strategy);

    let mut results = Vec::with_capacity(request.tickers.len());
    for ticker in &request.tickers {
        match analyze_one(&state, ticker, &profile).await {
            Ok(result) => results.push(AnalyzeEntry {
                ticker: ticker.to_uppercase(),
                result: Some(result),
                error: None,
            }),
            Err(err) => {
                warn!("Analysis failed for {}: {}", ticker, err);
                results.push(AnalyzeEntry {
                    ticker: ticker.to_uppercase(),
                    result: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok(Json(AnalyzeResponse {
        strategy: strategy.key(),
        results,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }))
}

/// Analyze one ticker and enrich it with an AI (or fallback) recommendation.
async fn analyze_one(
    state: &AppState,
    ticker: &str,
    profile: &StrategyProfile,
) -> Result<AnalysisResult> {
    state
        .market_data
        .ensure_history(ticker, &profile.timeframes)
        .await?;
    let quote = state.market_data.quote(ticker).await?;

    let (mut result, snapshot) = state
        .signal_engine
        .analyze_detailed(ticker, quote.price, profile)
        .await?;

    match state
        .ai_chain
        .analyze_indicators(ticker, &snapshot, quote.price)
        .await
    {
        Ok(recommendation) => {
            // The profile threshold gates whether AI output is surfaced.
            if recommendation.confidence >= profile.ml_confidence_threshold {
                result.ai_recommendation = Some(recommendation);
            } else {
                debug!(
                    "Dropping AI recommendation for {}: confidence {:.2} below threshold {:.2}",
                    ticker, recommendation.confidence, profile.ml_confidence_threshold
                );
            }
        }
        Err(err) => {
            warn!("AI enrichment failed for {}: {} - using local fallback", ticker, err);
            result.ai_recommendation = Some(fallback::local_recommendation(&snapshot, quote.price));
        }
    }

    Ok(result)
}
