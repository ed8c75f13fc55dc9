//! AI collaborator capability.
//!
//! All providers sit behind one [`AiProvider`] interface; selection and
//! fallback are an ordered-try loop with uniform error handling, not
//! per-provider branching. Local fallback output is always tagged
//! `local-fallback`, never presented as AI-sourced.

pub mod fallback;
pub mod openai_compat;

pub use openai_compat::ChatCompletionsProvider;

use crate::config::Config;
use crate::error::AppError;
use crate::types::{AiRecommendation, IndicatorSnapshot, SentimentReport};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// AI provider failure modes.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited")]
    RateLimited,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Transient failures are worth one retry; rate limits are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited => AppError::RateLimited("ai provider".to_string()),
            ProviderError::Unavailable(msg) => AppError::ProviderUnavailable(msg),
            ProviderError::InvalidResponse(msg) => AppError::ProviderUnavailable(msg),
        }
    }
}

/// A single AI provider capability.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Market sentiment for a ticker.
    async fn analyze_sentiment(
        &self,
        ticker: &str,
    ) -> std::result::Result<SentimentReport, ProviderError>;

    /// Trade recommendation from an indicator snapshot.
    async fn analyze_indicators(
        &self,
        ticker: &str,
        snapshot: &IndicatorSnapshot,
        current_price: f64,
    ) -> std::result::Result<AiRecommendation, ProviderError>;
}

/// Prioritized list of AI providers with uniform timeout/retry handling.
///
/// Each attempt gets the configured timeout; transient failures are retried
/// at most `max_retries` times, rate limits never. On failure the next
/// provider in priority order is tried.
pub struct ProviderChain {
    providers: Vec<Arc<dyn AiProvider>>,
    timeout: Duration,
    max_retries: u32,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn AiProvider>>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            providers,
            timeout,
            max_retries,
        }
    }

    /// Build the chain from configured API keys, in priority order
    /// OpenAI, DeepSeek, Together, DeepInfra.
    pub fn from_config(config: &Config) -> Self {
        let mut providers: Vec<Arc<dyn AiProvider>> = Vec::new();

        if let Some(ref key) = config.ai_keys.openai {
            providers.push(Arc::new(ChatCompletionsProvider::openai(key.clone())));
        }
        if let Some(ref key) = config.ai_keys.deepseek {
            providers.push(Arc::new(ChatCompletionsProvider::deepseek(key.clone())));
        }
        if let Some(ref key) = config.ai_keys.together {
            providers.push(Arc::new(ChatCompletionsProvider::together(key.clone())));
        }
        if let Some(ref key) = config.ai_keys.deepinfra {
            providers.push(Arc::new(ChatCompletionsProvider::deepinfra(key.clone())));
        }

        Self::new(
            providers,
            Duration::from_secs(config.ai_timeout_secs),
            config.ai_max_retries,
        )
    }

    /// True if at least one provider is configured.
    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Sentiment through the chain.
    pub async fn analyze_sentiment(
        &self,
        ticker: &str,
    ) -> std::result::Result<SentimentReport, ProviderError> {
        let mut last_err = ProviderError::Unavailable("no providers configured".to_string());

        for provider in &self.providers {
            let mut attempt = 0;
            loop {
                let call = provider.analyze_sentiment(ticker);
                let outcome = match tokio::time::timeout(self.timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Unavailable(format!(
                        "{} timed out",
                        provider.name()
                    ))),
                };

                match outcome {
                    Ok(report) => {
                        debug!("Sentiment for {} from {}", ticker, provider.name());
                        return Ok(report);
                    }
                    Err(err) => {
                        warn!("Provider {} sentiment failed: {}", provider.name(), err);
                        let retry = err.is_transient() && attempt < self.max_retries;
                        last_err = err;
                        if !retry {
                            break;
                        }
                        attempt += 1;
                    }
                }
            }
        }

        Err(last_err)
    }

    /// Indicator recommendation through the chain.
    pub async fn analyze_indicators(
        &self,
        ticker: &str,
        snapshot: &IndicatorSnapshot,
        current_price: f64,
    ) -> std::result::Result<AiRecommendation, ProviderError> {
        let mut last_err = ProviderError::Unavailable("no providers configured".to_string());

        for provider in &self.providers {
            let mut attempt = 0;
            loop {
                let call = provider.analyze_indicators(ticker, snapshot, current_price);
                let outcome = match tokio::time::timeout(self.timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Unavailable(format!(
                        "{} timed out",
                        provider.name()
                    ))),
                };

                match outcome {
                    Ok(recommendation) => {
                        debug!("Recommendation for {} from {}", ticker, provider.name());
                        return Ok(recommendation);
                    }
                    Err(err) => {
                        warn!(
                            "Provider {} recommendation failed: {}",
                            provider.name(),
                            err
                        );
                        let retry = err.is_transient() && attempt < self.max_retries;
                        last_err = err;
                        if !retry {
                            break;
                        }
                        attempt += 1;
                    }
                }
            }
        }

        Err(last_err)
    }
}
