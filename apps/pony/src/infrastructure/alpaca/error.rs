//! Alpaca-specific error types.

use thiserror::Error;

use crate::application::ports::BrokerError;

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlpacaError {
    /// API returned an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Order was rejected.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Network error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// A wire field held a value that does not convert to the domain.
    #[error("Invalid {field}: '{value}'")]
    InvalidField {
        /// Wire field name.
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// A non-replayable request failed in transit; the server may have
    /// acted on it.
    #[error("Request outcome unknown: {0}")]
    Unconfirmed(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Last failure seen.
        last_error: String,
    },

    /// Requested resource does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// Path that was requested.
        resource: String,
    },

    /// WebSocket transport failure.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Trade updates stream ended.
    #[error("Stream closed: {0}")]
    StreamClosed(String),
}

impl From<AlpacaError> for BrokerError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Network(message)
            | AlpacaError::WebSocket(message)
            | AlpacaError::Unconfirmed(message) => {
                Self::Connection { message }
            }
            AlpacaError::MaxRetriesExceeded { .. } => Self::Connection {
                message: err.to_string(),
            },
            AlpacaError::JsonParse(message) => Self::Decode { message },
            AlpacaError::InvalidField { .. } => Self::Decode {
                message: err.to_string(),
            },
            AlpacaError::Api { code, message } => Self::Unknown {
                message: format!("{code}: {message}"),
            },
            AlpacaError::OrderRejected(reason) => Self::Rejected { reason },
            AlpacaError::AuthenticationFailed(message) => Self::Authentication { message },
            AlpacaError::RateLimited { .. } => Self::RateLimited,
            AlpacaError::NotFound { resource } => Self::NotFound { resource },
            AlpacaError::StreamClosed(reason) => Self::StreamClosed { reason },
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AlpacaError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}
