pub mod analyze;
pub mod expected_move;
pub mod health;
pub mod market;
pub mod predictions;
pub mod sentiment;
pub mod technical;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(expected_move::router())
        .merge(analyze::router())
        .merge(sentiment::router())
        .merge(technical::router())
        .nest("/api/ticker-price", market::router())
        .nest("/api/predictions", predictions::router())
}
