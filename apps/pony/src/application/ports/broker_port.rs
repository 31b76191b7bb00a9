//! Broker Port (Driven Port)
//!
//! Interface for reading account state from, and submitting orders to, a
//! brokerage, plus the long-lived trade event subscription.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    Account, AccountId, BrokerEvent, BrokerOrderId, CreateOrderRequest, Order, Position,
};

/// Broker port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// Network or transport failure.
    #[error("Broker connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// Order rejected by broker.
    #[error("Order rejected: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// Requested entity does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// What was looked up.
        resource: String,
    },

    /// Rate limited.
    #[error("Rate limited by broker")]
    RateLimited,

    /// Credentials were refused.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error details.
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Failed to decode broker response: {message}")]
    Decode {
        /// Error details.
        message: String,
    },

    /// The event stream ended.
    #[error("Event stream closed: {reason}")]
    StreamClosed {
        /// Why the stream ended.
        reason: String,
    },

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for broker interactions.
///
/// Implementations enforce their own per-call timeout; callers never retry.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Get one account.
    async fn get_account(&self, account_id: &AccountId) -> Result<Account, BrokerError>;

    /// List every account visible to the credentials.
    async fn list_accounts(&self) -> Result<Vec<Account>, BrokerError>;

    /// List orders for an account.
    async fn list_orders(&self, account_id: &AccountId) -> Result<Vec<Order>, BrokerError>;

    /// Submit a new order.
    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, BrokerError>;

    /// Get an order by broker id.
    async fn get_order(&self, broker_order_id: &BrokerOrderId) -> Result<Order, BrokerError>;

    /// Cancel an order by broker id.
    async fn cancel_order(&self, broker_order_id: &BrokerOrderId) -> Result<(), BrokerError>;

    /// List open positions for an account.
    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, BrokerError>;

    /// Stream events into `sink` until the subscription ends.
    ///
    /// Returns `Ok(())` only when `cancel` fired; any other ending is an
    /// error. A `None` account subscribes to everything the credentials see.
    async fn subscribe_events(
        &self,
        account_id: Option<AccountId>,
        sink: mpsc::Sender<BrokerEvent>,
        cancel: CancellationToken,
    ) -> Result<(), BrokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_error_display() {
        let err = BrokerError::Rejected {
            reason: "insufficient buying power".to_string(),
        };
        assert_eq!(err.to_string(), "Order rejected: insufficient buying power");
        assert_eq!(BrokerError::RateLimited.to_string(), "Rate limited by broker");
    }
}
