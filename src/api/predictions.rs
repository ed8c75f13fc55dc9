//! Saved-predictions endpoints.
//!
//! Two named lists, one per strategy type. Append and delete happen only at
//! explicit user action; listing returns insertion order (newest last).

use crate::error::{AppError, Result};
use crate::services::PredictionStore;
use crate::types::{AnalysisResult, StrategyType};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsResponse {
    pub strategy: &'static str,
    pub predictions: Vec<AnalysisResult>,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResponse {
    pub saved: bool,
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:strategy", get(list).post(append))
        .route("/:strategy/:id", delete(remove))
}

fn parse_strategy(raw: &str) -> Result<StrategyType> {
    StrategyType::from_str(raw)
        .ok_or_else(|| AppError::InvalidInput(format!("unknown strategy '{}'", raw)))
}

/// GET /api/predictions/:strategy
async fn list(
    State(state): State<AppState>,
    Path(strategy): Path<String>,
) -> Result<Json<PredictionsResponse>> {
    let strategy = parse_strategy(&strategy)?;
    let predictions = state.prediction_store.list(strategy)?;

    Ok(Json(PredictionsResponse {
        strategy: strategy.key(),
        predictions,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }))
}

/// POST /api/predictions/:strategy
async fn append(
    State(state): State<AppState>,
    Path(strategy): Path<String>,
    Json(result): Json<AnalysisResult>,
) -> Result<Json<SavedResponse>> {
    let strategy = parse_strategy(&strategy)?;
    let id = result.id.clone();
    state.prediction_store.append(strategy, &result)?;

    Ok(Json(SavedResponse { saved: true, id }))
}

/// DELETE /api/predictions/:strategy/:id
async fn remove(
    State(state): State<AppState>,
    Path((strategy, id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>> {
    let strategy = parse_strategy(&strategy)?;
    let deleted = state.prediction_store.delete(strategy, &id)?;

    if !deleted {
        return Err(AppError::NotFound(format!(
            "no saved prediction '{}' in {} list",
            id,
            strategy.key()
        )));
    }

    Ok(Json(DeletedResponse { deleted, id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert!(parse_strategy("short-term").is_ok());
        assert!(parse_strategy("long-term").is_ok());
        assert!(parse_strategy("medium-term").is_err());
    }

    #[test]
    fn test_responses_serialize_camel_case() {
        let saved = SavedResponse {
            saved: true,
            id: "AAPL-1700000000000".to_string(),
        };
        let json = serde_json::to_string(&saved).unwrap();
        assert!(json.contains("\"saved\":true"));

        let deleted = DeletedResponse {
            deleted: true,
            id: "AAPL-1700000000000".to_string(),
        };
        let json = serde_json::to_string(&deleted).unwrap();
        assert!(json.contains("\"deleted\":true"));
    }
}
