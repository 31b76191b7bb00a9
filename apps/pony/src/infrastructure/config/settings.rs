//! Application Configuration Settings
//!
//! Loaded from environment variables (optionally via `.env`).

use std::path::PathBuf;
use std::time::Duration;

/// Trading environment (paper vs live).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Paper trading environment (simulated).
    #[default]
    Paper,
    /// Live trading environment (real money).
    Live,
}

impl Environment {
    /// Parse environment from string.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LIVE" => Self::Live,
            _ => Self::Paper,
        }
    }

    /// Check if this is the live environment.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Get the environment name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Live => "live",
        }
    }
}

/// Which broker implementation backs the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrokerKind {
    /// Alpaca Trading API.
    #[default]
    Alpaca,
    /// In-process demo broker.
    Mock,
}

impl BrokerKind {
    /// Parse broker kind from string.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "mock" => Self::Mock,
            _ => Self::Alpaca,
        }
    }

    /// Get the broker name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alpaca => "alpaca",
            Self::Mock => "mock",
        }
    }
}

/// Alpaca API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the API secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// True when either half is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_key.is_empty() || self.api_secret.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// HTTP client settings for the broker adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum attempts per request, including the first.
    pub max_retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Trading environment.
    pub environment: Environment,
    /// Broker implementation.
    pub broker: BrokerKind,
    /// API credentials (`None` for the mock broker).
    pub credentials: Option<Credentials>,
    /// Trading API base URL replacing the environment default.
    pub base_url: Option<String>,
    /// JSON snapshot backing the query store, if any.
    pub store_path: Option<PathBuf>,
    /// HTTP settings.
    pub http: HttpSettings,
    /// Message channel capacity.
    pub channel_capacity: usize,
    /// Log file path.
    pub log_file: PathBuf,
    /// Prometheus metrics port (0 = disabled).
    pub metrics_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            broker: BrokerKind::default(),
            credentials: None,
            base_url: None,
            store_path: None,
            http: HttpSettings::default(),
            channel_capacity: 256,
            log_file: PathBuf::from("pony.log"),
            metrics_port: 0,
        }
    }
}

impl AppConfig {
    /// Create configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from any key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let broker = lookup("PONY_BROKER")
            .map(|s| BrokerKind::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let credentials = match broker {
            BrokerKind::Mock => None,
            BrokerKind::Alpaca => Some(Credentials::new(
                required(&lookup, "ALPACA_KEY")?,
                required(&lookup, "ALPACA_SECRET")?,
            )),
        };

        let environment = lookup("PONY_ENV")
            .map(|s| Environment::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let base_url = lookup("ALPACA_BASE_URL").filter(|s| !s.trim().is_empty());

        let store_path = lookup("PONY_STORE_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let http = HttpSettings {
            timeout: parse_or(&lookup, "PONY_HTTP_TIMEOUT_SECS")
                .map_or(defaults.http.timeout, Duration::from_secs),
            max_retries: parse_or(&lookup, "PONY_HTTP_MAX_RETRIES")
                .unwrap_or(defaults.http.max_retries),
        };

        let channel_capacity = parse_or(&lookup, "PONY_CHANNEL_CAPACITY")
            .filter(|capacity| *capacity > 0)
            .unwrap_or(defaults.channel_capacity);

        let log_file = lookup("PONY_LOG_FILE")
            .filter(|s| !s.trim().is_empty())
            .map_or(defaults.log_file, PathBuf::from);

        let metrics_port =
            parse_or(&lookup, "PONY_METRICS_PORT").unwrap_or(defaults.metrics_port);

        Ok(Self {
            environment,
            broker,
            credentials,
            base_url,
            store_path,
            http,
            channel_capacity,
            log_file,
            metrics_port,
        })
    }

    /// Whether the Prometheus exporter should run.
    #[must_use]
    pub const fn metrics_enabled(&self) -> bool {
        self.metrics_port != 0
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

fn parse_or<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
