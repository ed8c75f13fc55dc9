//! Ticker quotes and OHLCV history.
//!
//! [`QuoteSource`] is the upstream boundary; [`YahooQuoteClient`] implements
//! it against the unofficial Yahoo Finance chart API. [`MarketDataService`]
//! adds quote caching and candle-store seeding for strategy timeframes.

use crate::error::{AppError, Result};
use crate::services::{Cache, CandleStore};
use crate::types::{OhlcCandle, TickerQuote};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Upstream source of quotes and OHLCV history.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Current quote for a ticker.
    async fn quote(&self, ticker: &str) -> Result<TickerQuote>;

    /// OHLCV history for a ticker over a range/interval pair.
    async fn history(&self, ticker: &str, range: &str, interval: &str)
        -> Result<Vec<OhlcCandle>>;
}

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    symbol: String,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Normalize a symbol for the Yahoo API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Yahoo Finance quote/history client.
pub struct YahooQuoteClient {
    client: Client,
}

impl YahooQuoteClient {
    /// Create a new client.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn fetch_chart(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<YahooResult> {
        let symbol = normalize_symbol(ticker);
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            symbol, range, interval
        );

        debug!("Fetching Yahoo chart data: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::DataUnavailable(format!("quote request for {} failed: {}", symbol, e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::DataUnavailable(format!(
                "quote lookup for {} returned {}",
                symbol,
                response.status()
            )));
        }

        let data: YahooChartResponse = response.json().await.map_err(|e| {
            AppError::DataUnavailable(format!("quote parse for {} failed: {}", symbol, e))
        })?;

        if let Some(error) = data.chart.error {
            return Err(AppError::DataUnavailable(format!(
                "quote lookup for {} failed: {} - {}",
                symbol, error.code, error.description
            )));
        }

        data.chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| {
                AppError::DataUnavailable(format!("no chart results for {}", symbol))
            })
    }
}

impl Default for YahooQuoteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteClient {
    async fn quote(&self, ticker: &str) -> Result<TickerQuote> {
        let result = self.fetch_chart(ticker, "1d", "5m").await?;
        let candles = candles_from_result(&result);

        let price = result
            .meta
            .regular_market_price
            .or_else(|| candles.last().map(|c| c.close))
            .ok_or_else(|| {
                AppError::DataUnavailable(format!("no price available for {}", ticker))
            })?;

        let previous_close = result.meta.previous_close.unwrap_or(price);
        let change = price - previous_close;
        let change_percent = if previous_close > 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        let high = result
            .meta
            .regular_market_day_high
            .or_else(|| candles.iter().map(|c| c.high).reduce(f64::max))
            .unwrap_or(price);
        let low = result
            .meta
            .regular_market_day_low
            .or_else(|| candles.iter().map(|c| c.low).reduce(f64::min))
            .unwrap_or(price);
        let volume = result
            .meta
            .regular_market_volume
            .unwrap_or_else(|| candles.iter().map(|c| c.volume).sum());

        Ok(TickerQuote {
            ticker: normalize_symbol(ticker),
            price,
            change,
            change_percent,
            high,
            low,
            volume,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    async fn history(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<OhlcCandle>> {
        let result = self.fetch_chart(ticker, range, interval).await?;
        let candles = candles_from_result(&result);

        if candles.is_empty() {
            return Err(AppError::DataUnavailable(format!(
                "no {}/{} history for {}",
                range, interval, ticker
            )));
        }

        Ok(candles)
    }
}

/// Extract candles from a chart result, skipping null/invalid points.
fn candles_from_result(result: &YahooResult) -> Vec<OhlcCandle> {
    let timestamps = match &result.timestamp {
        Some(ts) => ts,
        None => return Vec::new(),
    };
    let quote = match result.indicators.quote.first() {
        Some(q) => q,
        None => return Vec::new(),
    };

    let opens = quote.open.clone().unwrap_or_default();
    let highs = quote.high.clone().unwrap_or_default();
    let lows = quote.low.clone().unwrap_or_default();
    let closes = quote.close.clone().unwrap_or_default();
    let volumes = quote.volume.clone().unwrap_or_default();

    let mut candles = Vec::new();
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let open = opens.get(i).and_then(|v| *v).unwrap_or(0.0);
        let high = highs.get(i).and_then(|v| *v).unwrap_or(0.0);
        let low = lows.get(i).and_then(|v| *v).unwrap_or(0.0);
        let close = closes.get(i).and_then(|v| *v).unwrap_or(0.0);
        let volume = volumes.get(i).and_then(|v| *v).unwrap_or(0) as f64;

        if close <= 0.0 {
            continue;
        }

        candles.push(OhlcCandle {
            time: timestamp * 1000,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    candles
}

/// Aggregate consecutive candles into groups of `group` (e.g. 1h -> 4h).
fn resample(candles: &[OhlcCandle], group: usize) -> Vec<OhlcCandle> {
    if group <= 1 {
        return candles.to_vec();
    }

    candles
        .chunks(group)
        .filter_map(|chunk| {
            let first = chunk.first()?;
            let last = chunk.last()?;
            Some(OhlcCandle {
                time: first.time,
                open: first.open,
                high: chunk.iter().map(|c| c.high).fold(f64::MIN, f64::max),
                low: chunk.iter().map(|c| c.low).fold(f64::MAX, f64::min),
                close: last.close,
                volume: chunk.iter().map(|c| c.volume).sum(),
            })
        })
        .collect()
}

/// Upstream fetch parameters for a timeframe label:
/// (range, interval, resample group).
fn timeframe_params(timeframe: &str) -> Option<(&'static str, &'static str, usize)> {
    match timeframe {
        "5m" => Some(("5d", "5m", 1)),
        "15m" => Some(("5d", "15m", 1)),
        "1h" => Some(("1mo", "1h", 1)),
        "4h" => Some(("3mo", "1h", 4)),
        "1d" => Some(("1y", "1d", 1)),
        "1wk" => Some(("5y", "1wk", 1)),
        _ => None,
    }
}

/// Quote and history service with caching and candle-store seeding.
pub struct MarketDataService {
    source: Arc<dyn QuoteSource>,
    candles: Arc<CandleStore>,
    quote_cache: Cache<TickerQuote>,
}

impl MarketDataService {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        candles: Arc<CandleStore>,
        quote_ttl: Duration,
    ) -> Self {
        Self {
            source,
            candles,
            quote_cache: Cache::new(quote_ttl),
        }
    }

    /// Current quote for a ticker, cached for the configured TTL.
    pub async fn quote(&self, ticker: &str) -> Result<TickerQuote> {
        let key = normalize_symbol(ticker);
        if let Some(cached) = self.quote_cache.get(&key) {
            return Ok(cached);
        }

        let quote = self.source.quote(ticker).await?;
        self.quote_cache.set(key, quote.clone());
        Ok(quote)
    }

    /// Ensure the candle store holds history for every given timeframe.
    /// Fails with `DataUnavailable` if any timeframe cannot be covered.
    pub async fn ensure_history(&self, ticker: &str, timeframes: &[String]) -> Result<()> {
        for tf in timeframes {
            if self.candles.has_series(ticker, tf) {
                continue;
            }

            let (range, interval, group) = timeframe_params(tf).ok_or_else(|| {
                AppError::DataUnavailable(format!("unsupported timeframe '{}'", tf))
            })?;

            let raw = self.source.history(ticker, range, interval).await?;
            let series = resample(&raw, group);

            if series.is_empty() {
                warn!("Empty {} series for {} after resample", tf, ticker);
                return Err(AppError::DataUnavailable(format!(
                    "no {} history for {}",
                    tf, ticker
                )));
            }

            debug!("Seeded {} {} candles for {}", series.len(), tf, ticker);
            self.candles.replace_series(ticker, tf, series);
        }

        Ok(())
    }

    /// Shared candle store backing this service.
    pub fn candle_store(&self) -> Arc<CandleStore> {
        self.candles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly_candles(count: usize) -> Vec<OhlcCandle> {
        (0..count)
            .map(|i| OhlcCandle {
                time: 1_700_000_000_000 + i as i64 * 3_600_000,
                open: 100.0 + i as f64,
                high: 102.0 + i as f64,
                low: 99.0 + i as f64,
                close: 101.0 + i as f64,
                volume: 1000.0,
            })
            .collect()
    }

    struct StubSource {
        candles: Vec<OhlcCandle>,
    }

    #[async_trait]
    impl QuoteSource for StubSource {
        async fn quote(&self, ticker: &str) -> Result<TickerQuote> {
            Ok(TickerQuote {
                ticker: normalize_symbol(ticker),
                price: 100.0,
                change: 1.0,
                change_percent: 1.0,
                high: 102.0,
                low: 99.0,
                volume: 1000.0,
                timestamp: 0,
            })
        }

        async fn history(&self, _: &str, _: &str, _: &str) -> Result<Vec<OhlcCandle>> {
            if self.candles.is_empty() {
                Err(AppError::DataUnavailable("stub has no candles".to_string()))
            } else {
                Ok(self.candles.clone())
            }
        }
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("aapl"), "AAPL");
        assert_eq!(normalize_symbol("BRK.B"), "BRK-B");
    }

    #[test]
    fn test_resample_groups_of_four() {
        let hourly = hourly_candles(8);
        let four_hour = resample(&hourly, 4);

        assert_eq!(four_hour.len(), 2);
        assert_eq!(four_hour[0].open, hourly[0].open);
        assert_eq!(four_hour[0].close, hourly[3].close);
        assert_eq!(four_hour[0].high, hourly[3].high);
        assert_eq!(four_hour[0].low, hourly[0].low);
        assert_eq!(four_hour[0].volume, 4000.0);
    }

    #[test]
    fn test_resample_group_of_one_is_identity() {
        let hourly = hourly_candles(5);
        assert_eq!(resample(&hourly, 1), hourly);
    }

    #[test]
    fn test_timeframe_params_known_labels() {
        for tf in ["5m", "15m", "1h", "4h", "1d", "1wk"] {
            assert!(timeframe_params(tf).is_some(), "missing mapping for {}", tf);
        }
        assert!(timeframe_params("3mo").is_none());
    }

    #[test]
    fn test_chart_response_parsing() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "regularMarketPrice": 189.5,
                        "previousClose": 188.0
                    },
                    "timestamp": [1700000000, 1700000300],
                    "indicators": {
                        "quote": [{
                            "open": [189.0, null],
                            "high": [190.0, 189.8],
                            "low": [188.5, 189.0],
                            "close": [189.5, 189.6],
                            "volume": [100000, 120000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let parsed: YahooChartResponse = serde_json::from_str(json).unwrap();
        let result = parsed.chart.result.unwrap().into_iter().next().unwrap();
        assert_eq!(result.meta.symbol, "AAPL");

        let candles = candles_from_result(&result);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_700_000_000_000);
    }

    #[test]
    fn test_chart_error_parsing() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;

        let parsed: YahooChartResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.chart.result.is_none());
        assert_eq!(parsed.chart.error.unwrap().code, "Not Found");
    }

    #[tokio::test]
    async fn test_quote_is_cached() {
        let service = MarketDataService::new(
            Arc::new(StubSource {
                candles: hourly_candles(4),
            }),
            CandleStore::shared(),
            Duration::from_secs(60),
        );

        let first = service.quote("aapl").await.unwrap();
        assert_eq!(first.ticker, "AAPL");
        assert!(service.quote_cache.contains("AAPL"));
    }

    #[tokio::test]
    async fn test_ensure_history_seeds_store() {
        let store = CandleStore::shared();
        let service = MarketDataService::new(
            Arc::new(StubSource {
                candles: hourly_candles(60),
            }),
            store.clone(),
            Duration::from_secs(60),
        );

        service
            .ensure_history("AAPL", &["1h".to_string(), "4h".to_string()])
            .await
            .unwrap();

        assert!(store.has_series("AAPL", "1h"));
        assert!(store.has_series("AAPL", "4h"));
        // 60 hourly candles resample into 15 four-hour candles.
        assert_eq!(store.series("AAPL", "4h").unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_ensure_history_unsupported_timeframe() {
        let service = MarketDataService::new(
            Arc::new(StubSource {
                candles: hourly_candles(10),
            }),
            CandleStore::shared(),
            Duration::from_secs(60),
        );

        let err = service
            .ensure_history("AAPL", &["2wk".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_ensure_history_upstream_failure() {
        let service = MarketDataService::new(
            Arc::new(StubSource { candles: vec![] }),
            CandleStore::shared(),
            Duration::from_secs(60),
        );

        let err = service
            .ensure_history("AAPL", &["1d".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(_)));
    }
}
