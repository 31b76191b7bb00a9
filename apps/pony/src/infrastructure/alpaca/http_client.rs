//! HTTP client wrapper with retry logic.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::{AlpacaConfig, RetryConfig};
use super::error::AlpacaError;

/// HTTP client for the Alpaca trading API with retry logic.
#[derive(Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
    retry_config: RetryConfig,
}

impl std::fmt::Debug for AlpacaHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaHttpClient")
            .field("base_url", &self.base_url)
            .field("retry_config", &self.retry_config)
            .finish_non_exhaustive()
    }
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(AlpacaError::AuthenticationFailed(
                "API key and secret are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            base_url: config.trading_base_url().trim_end_matches('/').to_string(),
            retry_config: config.retry.clone(),
        })
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        self.request(Method::GET, path, None::<&()>, Replay::Always)
            .await
    }

    /// Make a POST request with a JSON body.
    ///
    /// Only rate-limit refusals are replayed. A timeout, dropped connection
    /// or gateway error may have reached the server, so it surfaces as
    /// [`AlpacaError::Unconfirmed`] for the caller to resolve.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.request(Method::POST, path, Some(body), Replay::RateLimitedOnly)
            .await
    }

    /// Make a DELETE request, discarding any body.
    pub async fn delete(&self, path: &str) -> Result<(), AlpacaError> {
        let _: serde_json::Value = self
            .request(Method::DELETE, path, None::<&()>, Replay::Always)
            .await?;
        Ok(())
    }

    /// Send `method path` until it succeeds, fails for good, or the retry
    /// budget runs out.
    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        replay: Replay,
    ) -> Result<T, AlpacaError> {
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let (error, server_hint) = match self.attempt(&method, path, body).await {
                Ok(value) => return Ok(value),
                Err(Failure::Fatal(error)) => return Err(error),
                Err(Failure::Transient { error, retry_after }) => (error, retry_after),
            };

            let rate_limited = matches!(error, AlpacaError::RateLimited { .. });
            if replay == Replay::RateLimitedOnly && !rate_limited {
                return Err(AlpacaError::Unconfirmed(error.to_string()));
            }

            let Some(delay) = backoff.next_backoff() else {
                return Err(match error {
                    rate_limited @ AlpacaError::RateLimited { .. } => rate_limited,
                    other => AlpacaError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                        last_error: other.to_string(),
                    },
                });
            };
            let delay = retry_delay(server_hint, delay, self.retry_config.max_backoff);

            tracing::warn!(
                error = %error,
                %method,
                path,
                attempt = backoff.attempt,
                delay_ms = delay.as_millis(),
                "Alpaca request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, Failure> {
        let mut request = self
            .client
            .request(method.clone(), format!("{}{path}", self.base_url))
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| Failure::Transient {
            error: AlpacaError::Network(e.to_string()),
            retry_after: None,
        })?;
        let status = response.status();

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| Failure::Fatal(AlpacaError::Network(e.to_string())))?;
            // DELETE answers with an empty body.
            let text = if text.trim().is_empty() { "null" } else { &text };
            return serde_json::from_str(text)
                .map_err(|e| Failure::Fatal(AlpacaError::JsonParse(e.to_string())));
        }

        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let raw = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<AlpacaErrorResponse>(&raw) {
            Ok(parsed) => (
                parsed
                    .code_string()
                    .unwrap_or_else(|| status.as_u16().to_string()),
                parsed.message,
            ),
            Err(_) => (status.as_u16().to_string(), raw),
        };

        Err(match categorize_status(status) {
            ErrorCategory::RateLimited => Failure::Transient {
                error: AlpacaError::RateLimited {
                    retry_after_secs: retry_after_secs.unwrap_or(60),
                },
                retry_after: retry_after_secs.map(Duration::from_secs),
            },
            ErrorCategory::Retryable => Failure::Transient {
                error: AlpacaError::Api { code, message },
                retry_after: None,
            },
            ErrorCategory::NonRetryable => {
                tracing::debug!(status = status.as_u16(), %code, %message, path, "Alpaca request refused");
                Failure::Fatal(refusal(status, method, path, code, message))
            }
        })
    }
}

/// Which transient failures a request may be sent again after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    Always,
    RateLimitedOnly,
}

/// Outcome of one failed attempt.
enum Failure {
    /// Another attempt may succeed; `retry_after` is the server's hint.
    Transient {
        error: AlpacaError,
        retry_after: Option<Duration>,
    },
    /// Retrying cannot help.
    Fatal(AlpacaError),
}

/// Map a non-retryable status to an error.
fn refusal(
    status: StatusCode,
    method: &Method,
    path: &str,
    code: String,
    message: String,
) -> AlpacaError {
    match status {
        StatusCode::UNAUTHORIZED => AlpacaError::AuthenticationFailed(message),
        // Alpaca refuses order submissions it won't accept (e.g. buying power) with 403.
        StatusCode::FORBIDDEN if *method == Method::POST => AlpacaError::OrderRejected(message),
        StatusCode::FORBIDDEN => AlpacaError::AuthenticationFailed(message),
        StatusCode::NOT_FOUND => AlpacaError::NotFound {
            resource: path.to_string(),
        },
        StatusCode::UNPROCESSABLE_ENTITY => AlpacaError::OrderRejected(message),
        _ => AlpacaError::Api { code, message },
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Delay before the next attempt. A server hint wins over the computed
/// backoff but never exceeds `max_backoff`.
fn retry_delay(server_hint: Option<Duration>, backoff: Duration, max_backoff: Duration) -> Duration {
    server_hint.map_or_else(|| with_jitter(backoff), |hint| hint.min(max_backoff))
}

/// Add up to 10% random jitter so concurrent retries spread out.
fn with_jitter(delay: Duration) -> Duration {
    let max_jitter_ms = u64::try_from(delay.as_millis() / 10).unwrap_or(0);
    if max_jitter_ms == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::rng().random_range(0..=max_jitter_ms))
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}
