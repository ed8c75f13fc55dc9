//! Cybertrader - trading signal and expected-move analytics server

pub mod ai;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod services;
pub mod types;

use crate::ai::ProviderChain;
use crate::config::Config;
use crate::engine::{IndicatorSource, SignalEngine};
use crate::services::{MarketDataService, PredictionStore};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub market_data: Arc<MarketDataService>,
    pub indicator_source: Arc<dyn IndicatorSource>,
    pub signal_engine: Arc<SignalEngine>,
    pub ai_chain: Arc<ProviderChain>,
    pub prediction_store: Arc<dyn PredictionStore>,
}

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::*;
