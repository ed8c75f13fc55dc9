use crate::types::OhlcCandle;
use dashmap::DashMap;
use std::sync::Arc;

/// In-process OHLCV store, keyed by symbol and timeframe label.
///
/// Series are replaced wholesale from upstream history fetches; there is no
/// streaming ingest. Candles are kept in the order they were supplied.
pub struct CandleStore {
    /// Key format: "{symbol}:{timeframe}".
    data: DashMap<String, Vec<OhlcCandle>>,
}

impl CandleStore {
    /// Create a new candle store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Create a shared candle store.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn key(symbol: &str, timeframe: &str) -> String {
        format!("{}:{}", symbol.to_lowercase(), timeframe)
    }

    /// Replace the series for a symbol/timeframe.
    pub fn replace_series(&self, symbol: &str, timeframe: &str, candles: Vec<OhlcCandle>) {
        self.data.insert(Self::key(symbol, timeframe), candles);
    }

    /// Get the series for a symbol/timeframe, if present and non-empty.
    pub fn series(&self, symbol: &str, timeframe: &str) -> Option<Vec<OhlcCandle>> {
        let entry = self.data.get(&Self::key(symbol, timeframe))?;
        if entry.is_empty() {
            None
        } else {
            Some(entry.clone())
        }
    }

    /// Last close of a series, if present.
    pub fn last_close(&self, symbol: &str, timeframe: &str) -> Option<f64> {
        self.series(symbol, timeframe)
            .and_then(|candles| candles.last().map(|c| c.close))
    }

    /// True if a non-empty series exists for the symbol/timeframe.
    pub fn has_series(&self, symbol: &str, timeframe: &str) -> bool {
        self.series(symbol, timeframe).is_some()
    }
}

impl Default for CandleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(count: usize) -> Vec<OhlcCandle> {
        (0..count)
            .map(|i| OhlcCandle {
                time: 1_700_000_000_000 + i as i64 * 60_000,
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + i as f64,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_replace_and_get_series() {
        let store = CandleStore::new();
        store.replace_series("AAPL", "1h", candles(5));

        let series = store.series("AAPL", "1h").unwrap();
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_symbol_keys_case_insensitive() {
        let store = CandleStore::new();
        store.replace_series("AAPL", "1h", candles(3));

        assert!(store.has_series("aapl", "1h"));
        assert!(store.has_series("AaPl", "1h"));
    }

    #[test]
    fn test_timeframes_are_distinct() {
        let store = CandleStore::new();
        store.replace_series("AAPL", "1h", candles(3));

        assert!(store.series("AAPL", "4h").is_none());
    }

    #[test]
    fn test_empty_series_reads_as_missing() {
        let store = CandleStore::new();
        store.replace_series("AAPL", "1h", Vec::new());

        assert!(store.series("AAPL", "1h").is_none());
        assert!(!store.has_series("AAPL", "1h"));
    }

    #[test]
    fn test_last_close() {
        let store = CandleStore::new();
        store.replace_series("AAPL", "1d", candles(4));

        assert_eq!(store.last_close("AAPL", "1d"), Some(103.0));
        assert!(store.last_close("MSFT", "1d").is_none());
    }

    #[test]
    fn test_replace_overwrites() {
        let store = CandleStore::new();
        store.replace_series("AAPL", "1h", candles(10));
        store.replace_series("AAPL", "1h", candles(2));

        assert_eq!(store.series("AAPL", "1h").unwrap().len(), 2);
    }
}
