//! Store Port (Driven Port)
//!
//! Optional read-only query store for accounts, orders and positions.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Order, Position};

/// Store port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backing storage could not be read.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Stored data is malformed.
    #[error("Corrupt store data: {message}")]
    Corrupt {
        /// Error details.
        message: String,
    },
}

/// Port for the query store.
#[async_trait]
pub trait StorePort: Send + Sync {
    /// List stored accounts.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// List stored orders for an account.
    async fn list_orders(&self, account_id: &AccountId) -> Result<Vec<Order>, StoreError>;

    /// List stored positions for an account.
    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, StoreError>;
}
