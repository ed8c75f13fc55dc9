//! Ticker price endpoint.

use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

/// Ticker price response. `success` is false on lookup failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerPriceResponse {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/:ticker", get(ticker_price))
}

/// GET /api/ticker-price/:ticker
async fn ticker_price(State(state): State<AppState>, Path(ticker): Path<String>) -> Response {
    match state.market_data.quote(&ticker).await {
        Ok(quote) => (
            StatusCode::OK,
            Json(TickerPriceResponse {
                ticker: quote.ticker,
                price: quote.price,
                change: quote.change,
                change_percent: quote.change_percent,
                high: quote.high,
                low: quote.low,
                volume: quote.volume,
                success: true,
                error: None,
            }),
        )
            .into_response(),
        Err(err) => {
            warn!("Price lookup failed for {}: {}", ticker, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TickerPriceResponse {
                    ticker: ticker.to_uppercase(),
                    price: 0.0,
                    change: 0.0,
                    change_percent: 0.0,
                    high: 0.0,
                    low: 0.0,
                    volume: 0.0,
                    success: false,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
