//! JSON snapshot file store.
//!
//! The file holds `{"accounts": [...], "orders": [...], "positions": [...]}`
//! and is read once when the store opens.

use std::path::Path;

use async_trait::async_trait;

use super::in_memory::{InMemoryStore, StoreSnapshot};
use crate::application::ports::{StoreError, StorePort};
use crate::domain::{Account, AccountId, Order, Position};

/// Store backed by a JSON snapshot loaded at startup.
#[derive(Debug)]
pub struct JsonFileStore {
    inner: InMemoryStore,
}

impl JsonFileStore {
    /// Load the snapshot at `path`.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the file cannot be read, `Corrupt` when it is not
    /// a valid snapshot.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Unavailable {
                message: format!("{}: {e}", path.display()),
            })?;
        let snapshot: StoreSnapshot =
            serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
                message: format!("{}: {e}", path.display()),
            })?;

        tracing::info!(
            path = %path.display(),
            accounts = snapshot.accounts.len(),
            orders = snapshot.orders.len(),
            positions = snapshot.positions.len(),
            "Loaded store snapshot"
        );

        Ok(Self {
            inner: InMemoryStore::from_snapshot(snapshot),
        })
    }
}

#[async_trait]
impl StorePort for JsonFileStore {
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.inner.list_accounts().await
    }

    async fn list_orders(&self, account_id: &AccountId) -> Result<Vec<Order>, StoreError> {
        self.inner.list_orders(account_id).await
    }

    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, StoreError> {
        self.inner.list_positions(account_id).await
    }
}
