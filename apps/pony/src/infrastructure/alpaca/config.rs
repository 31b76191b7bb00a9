//! Alpaca adapter configuration.

use std::time::Duration;

use crate::infrastructure::config::{AppConfig, Environment};

const PAPER_TRADING_URL: &str = "https://paper-api.alpaca.markets";
const LIVE_TRADING_URL: &str = "https://api.alpaca.markets";
const PAPER_STREAM_URL: &str = "wss://paper-api.alpaca.markets/stream";
const LIVE_STREAM_URL: &str = "wss://api.alpaca.markets/stream";

/// The trade updates stream lives at `/stream` on the trading host.
fn stream_url_for(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = base
        .strip_prefix("https://")
        .map(|host| format!("wss://{host}"))
        .or_else(|| base.strip_prefix("http://").map(|host| format!("ws://{host}")))
        .unwrap_or_else(|| base.to_string());
    format!("{base}/stream")
}

/// Configuration for the Alpaca broker adapter.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Trading environment.
    pub environment: Environment,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy configuration.
    pub retry: RetryConfig,
    trading_url_override: Option<String>,
    stream_url_override: Option<String>,
}

impl AlpacaConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(api_key: String, api_secret: String, environment: Environment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            trading_url_override: None,
            stream_url_override: None,
        }
    }

    /// Build the adapter configuration from application settings.
    ///
    /// Returns `None` when the settings carry no credentials.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Option<Self> {
        let credentials = config.credentials.as_ref()?;
        let alpaca = Self::new(
            credentials.api_key().to_string(),
            credentials.api_secret().to_string(),
            config.environment,
        )
        .with_timeout(config.http.timeout)
        .with_retry(RetryConfig {
            max_attempts: config.http.max_retries.max(1),
            ..RetryConfig::default()
        });

        Some(match &config.base_url {
            Some(url) => alpaca
                .with_stream_url(stream_url_for(url))
                .with_trading_url(url.clone()),
            None => alpaca,
        })
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Point the REST client at another host (test servers).
    #[must_use]
    pub fn with_trading_url(mut self, url: impl Into<String>) -> Self {
        self.trading_url_override = Some(url.into());
        self
    }

    /// Point the stream client at another host (test servers).
    #[must_use]
    pub fn with_stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url_override = Some(url.into());
        self
    }

    /// Get the trading API base URL.
    #[must_use]
    pub fn trading_base_url(&self) -> &str {
        self.trading_url_override
            .as_deref()
            .unwrap_or(match self.environment {
                Environment::Paper => PAPER_TRADING_URL,
                Environment::Live => LIVE_TRADING_URL,
            })
    }

    /// Get the trade updates WebSocket URL.
    #[must_use]
    pub fn stream_url(&self) -> &str {
        self.stream_url_override
            .as_deref()
            .unwrap_or(match self.environment {
                Environment::Paper => PAPER_STREAM_URL,
                Environment::Live => LIVE_STREAM_URL,
            })
    }
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{Credentials, HttpSettings};

    fn config(environment: Environment) -> AlpacaConfig {
        AlpacaConfig::new("key".to_string(), "secret".to_string(), environment)
    }

    #[test]
    fn paper_environment_urls() {
        let config = config(Environment::Paper);
        assert_eq!(config.trading_base_url(), "https://paper-api.alpaca.markets");
        assert_eq!(config.stream_url(), "wss://paper-api.alpaca.markets/stream");
    }

    #[test]
    fn live_environment_urls() {
        let config = config(Environment::Live);
        assert!(!config.trading_base_url().contains("paper"));
        assert!(!config.stream_url().contains("paper"));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = config(Environment::Live)
            .with_trading_url("http://127.0.0.1:9000")
            .with_stream_url("ws://127.0.0.1:9001");
        assert_eq!(config.trading_base_url(), "http://127.0.0.1:9000");
        assert_eq!(config.stream_url(), "ws://127.0.0.1:9001");
    }

    #[test]
    fn from_app_config_copies_http_settings() {
        let app = AppConfig {
            credentials: Some(Credentials::new("k".to_string(), "s".to_string())),
            http: HttpSettings {
                timeout: Duration::from_secs(5),
                max_retries: 0,
            },
            ..AppConfig::default()
        };
        let config = AlpacaConfig::from_app_config(&app).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn base_url_moves_both_endpoints() {
        let app = AppConfig {
            credentials: Some(Credentials::new("k".to_string(), "s".to_string())),
            environment: Environment::Live,
            base_url: Some("https://broker.example.com/".to_string()),
            ..AppConfig::default()
        };
        let config = AlpacaConfig::from_app_config(&app).unwrap();
        assert_eq!(config.trading_base_url(), "https://broker.example.com/");
        assert_eq!(config.stream_url(), "wss://broker.example.com/stream");

        assert_eq!(stream_url_for("http://127.0.0.1:9000"), "ws://127.0.0.1:9000/stream");
    }

    #[test]
    fn from_app_config_without_credentials() {
        assert!(AlpacaConfig::from_app_config(&AppConfig::default()).is_none());
    }
}
