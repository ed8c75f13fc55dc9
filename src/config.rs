use std::env;

/// AI provider API keys. A provider is enabled when its key is present;
/// chain priority is OpenAI, DeepSeek, Together, DeepInfra.
#[derive(Debug, Clone, Default)]
pub struct AiProviderKeys {
    pub openai: Option<String>,
    pub deepseek: Option<String>,
    pub together: Option<String>,
    pub deepinfra: Option<String>,
}

impl AiProviderKeys {
    /// True if at least one provider key is configured.
    pub fn any_configured(&self) -> bool {
        self.openai.is_some()
            || self.deepseek.is_some()
            || self.together.is_some()
            || self.deepinfra.is_some()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// AI provider keys, in chain priority order.
    pub ai_keys: AiProviderKeys,
    /// Per-attempt timeout for AI provider calls (seconds).
    pub ai_timeout_secs: u64,
    /// Max retries for transient AI provider failures (rate limits never retry).
    pub ai_max_retries: u32,
    /// SQLite database path for saved predictions.
    pub db_path: String,
    /// TTL for cached ticker quotes (seconds).
    pub quote_cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        Self {
            host,
            port,
            ai_keys: AiProviderKeys {
                openai: env::var("OPENAI_API_KEY").ok(),
                deepseek: env::var("DEEPSEEK_API_KEY").ok(),
                together: env::var("TOGETHER_API_KEY").ok(),
                deepinfra: env::var("DEEPINFRA_API_KEY").ok(),
            },
            ai_timeout_secs: env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            ai_max_retries: env::var("AI_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "cybertrader.db".to_string()),
            quote_cache_ttl_secs: env::var("QUOTE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_keys_none_configured() {
        let keys = AiProviderKeys::default();
        assert!(!keys.any_configured());
    }

    #[test]
    fn test_ai_keys_one_configured() {
        let keys = AiProviderKeys {
            deepseek: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(keys.any_configured());
    }

    #[test]
    fn test_config_explicit_values() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ai_keys: AiProviderKeys::default(),
            ai_timeout_secs: 10,
            ai_max_retries: 1,
            db_path: "test.db".to_string(),
            quote_cache_ttl_secs: 30,
        };

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.ai_timeout_secs, 10);
        assert_eq!(config.ai_max_retries, 1);
    }

    #[test]
    fn test_config_clone() {
        let config = Config {
            host: "localhost".to_string(),
            port: 3001,
            ai_keys: AiProviderKeys {
                openai: Some("key".to_string()),
                ..Default::default()
            },
            ai_timeout_secs: 5,
            ai_max_retries: 2,
            db_path: "db".to_string(),
            quote_cache_ttl_secs: 60,
        };

        let cloned = config.clone();
        assert_eq!(cloned.port, config.port);
        assert_eq!(cloned.ai_keys.openai, config.ai_keys.openai);
    }
}
