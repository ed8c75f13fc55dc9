use cybertrader::ai::ProviderChain;
use cybertrader::api;
use cybertrader::config::Config;
use cybertrader::engine::{CandleIndicatorSource, SignalEngine};
use cybertrader::services::{
    CandleStore, MarketDataService, MemoryPredictionStore, PredictionStore,
    SqlitePredictionStore, YahooQuoteClient,
};
use cybertrader::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cybertrader=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Cybertrader server on {}:{}", config.host, config.port);

    // Market data: Yahoo quotes/history behind a shared candle store
    let candle_store = CandleStore::shared();
    let market_data = Arc::new(MarketDataService::new(
        Arc::new(YahooQuoteClient::new()),
        candle_store.clone(),
        Duration::from_secs(config.quote_cache_ttl_secs),
    ));

    // Signal engine over the candle-backed indicator source
    let indicator_source = Arc::new(CandleIndicatorSource::new(candle_store));
    let signal_engine = Arc::new(SignalEngine::new(indicator_source.clone()));

    // AI provider chain from configured keys
    let ai_chain = Arc::new(ProviderChain::from_config(&config));
    if ai_chain.has_providers() {
        info!("AI provider chain configured");
    } else {
        warn!("No AI provider keys configured - recommendations use the local fallback");
    }

    // Saved-predictions store: SQLite, with in-memory fallback
    let prediction_store: Arc<dyn PredictionStore> =
        match SqlitePredictionStore::new(&config.db_path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("SQLite unavailable ({}), using in-memory prediction store", e);
                Arc::new(MemoryPredictionStore::new())
            }
        };

    // Create application state
    let state = AppState {
        config: config.clone(),
        market_data,
        indicator_source,
        signal_engine,
        ai_chain,
        prediction_store,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Cybertrader server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
