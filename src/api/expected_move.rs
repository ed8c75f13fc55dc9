//! Expected-move endpoint.

use crate::engine::{ExpectedMoveCalculator, ExpectedMoveResult};
use crate::error::Result;
use crate::AppState;
use axum::{routing::post, Json, Router};
use serde::Deserialize;

/// Request body for the expected-move computation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedMoveRequest {
    pub price: f64,
    pub volatility_pct: f64,
    pub days: u32,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/expected-move", post(compute))
}

/// POST /api/expected-move
async fn compute(Json(request): Json<ExpectedMoveRequest>) -> Result<Json<ExpectedMoveResult>> {
    let result =
        ExpectedMoveCalculator::compute(request.price, request.volatility_pct, request.days)?;
    Ok(Json(result))
}
