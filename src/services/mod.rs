pub mod cache;
pub mod candle_store;
pub mod market_data;
pub mod predictions;

pub use cache::Cache;
pub use candle_store::CandleStore;
pub use market_data::{MarketDataService, QuoteSource, YahooQuoteClient};
pub use predictions::{MemoryPredictionStore, PredictionStore, SqlitePredictionStore};
