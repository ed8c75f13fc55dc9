//! OpenAI-compatible chat-completions provider.
//!
//! One implementation serves every configured vendor: OpenAI, DeepSeek,
//! Together, and DeepInfra all expose the same chat-completions shape, so a
//! provider is just a (name, base URL, model, key) tuple.

use crate::ai::{AiProvider, ProviderError};
use crate::types::{
    AiAction, AiRecommendation, IndicatorSnapshot, RecommendationSource, SentimentLabel,
    SentimentReport,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Chat completions provider against an OpenAI-compatible endpoint.
pub struct ChatCompletionsProvider {
    name: &'static str,
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Sentiment payload requested from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentPayload {
    sentiment: SentimentLabel,
    confidence: f64,
    analysis: String,
}

/// Recommendation payload requested from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationPayload {
    recommendation: AiAction,
    confidence: f64,
    entry_price: f64,
    target_price: f64,
    stop_loss: f64,
    expected_gain_pct: f64,
    analysis: String,
}

impl ChatCompletionsProvider {
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            name,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client,
        }
    }

    pub fn openai(api_key: String) -> Self {
        Self::new("openai", "https://api.openai.com/v1", "gpt-4o-mini", api_key)
    }

    pub fn deepseek(api_key: String) -> Self {
        Self::new("deepseek", "https://api.deepseek.com/v1", "deepseek-chat", api_key)
    }

    pub fn together(api_key: String) -> Self {
        Self::new(
            "together",
            "https://api.together.xyz/v1",
            "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
            api_key,
        )
    }

    pub fn deepinfra(api_key: String) -> Self {
        Self::new(
            "deepinfra",
            "https://api.deepinfra.com/v1/openai",
            "meta-llama/Meta-Llama-3.1-70B-Instruct",
            api_key,
        )
    }

    /// Run one chat completion and return the raw message content.
    async fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.2,
        };

        debug!("Calling {} ({})", self.name, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("{}: {}", self.name, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ProviderError::Unavailable(format!(
                "{} returned {}",
                self.name, status
            )));
        }
        if !status.is_success() {
            // 4xx: the request itself is bad for this provider; not retryable.
            return Err(ProviderError::InvalidResponse(format!(
                "{} returned {}",
                self.name, status
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", self.name, e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(format!("{}: empty choices", self.name))
            })
    }
}

/// Strip markdown code fences so the content parses as bare JSON.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    provider: &str,
    content: &str,
) -> std::result::Result<T, ProviderError> {
    serde_json::from_str(strip_code_fences(content))
        .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", provider, e)))
}

const SENTIMENT_SYSTEM: &str = "You are a market analyst. Respond with a single JSON object \
    {\"sentiment\":\"bullish\"|\"bearish\"|\"neutral\",\"confidence\":<0..1>,\"analysis\":\"...\"} \
    and nothing else.";

const INDICATORS_SYSTEM: &str = "You are a technical analyst. Given indicator readings, respond \
    with a single JSON object {\"recommendation\":\"buy\"|\"sell\"|\"hold\",\"confidence\":<0..1>,\
    \"entryPrice\":<number>,\"targetPrice\":<number>,\"stopLoss\":<number>,\
    \"expectedGainPct\":<number>,\"analysis\":\"...\"} and nothing else.";

#[async_trait]
impl AiProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn analyze_sentiment(
        &self,
        ticker: &str,
    ) -> std::result::Result<SentimentReport, ProviderError> {
        let user = format!("Assess current market sentiment for {}.", ticker.to_uppercase());
        let content = self.complete(SENTIMENT_SYSTEM, &user).await?;
        let payload: SentimentPayload = parse_payload(self.name, &content)?;

        Ok(SentimentReport {
            ticker: ticker.to_uppercase(),
            sentiment: payload.sentiment,
            confidence: payload.confidence.clamp(0.0, 1.0),
            analysis: payload.analysis,
            source: RecommendationSource::Ai,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    async fn analyze_indicators(
        &self,
        ticker: &str,
        snapshot: &IndicatorSnapshot,
        current_price: f64,
    ) -> std::result::Result<AiRecommendation, ProviderError> {
        let readings = serde_json::to_string(snapshot)
            .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", self.name, e)))?;
        let user = format!(
            "Ticker {} trades at {:.4}. Indicator readings: {}",
            ticker.to_uppercase(),
            current_price,
            readings
        );

        let content = self.complete(INDICATORS_SYSTEM, &user).await?;
        let payload: RecommendationPayload = parse_payload(self.name, &content)?;

        Ok(AiRecommendation {
            action: payload.recommendation,
            confidence: payload.confidence.clamp(0.0, 1.0),
            entry_price: payload.entry_price,
            target_price: payload.target_price,
            stop_loss: payload.stop_loss,
            expected_gain_pct: payload.expected_gain_pct,
            analysis: payload.analysis,
            source: RecommendationSource::Ai,
        })
    }
}
