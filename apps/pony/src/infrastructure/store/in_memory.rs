//! In-memory query store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{StoreError, StorePort};
use crate::domain::{Account, AccountId, Order, Position};

/// Everything the store holds; also the on-disk JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Accounts, in insertion order.
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Orders across all accounts, in insertion order.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Positions across all accounts, in insertion order.
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// In-memory implementation of `StorePort`.
///
/// Listings come back in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: StoreSnapshot,
}

impl InMemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            data: snapshot,
        }
    }
}

#[async_trait]
impl StorePort for InMemoryStore {
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.data.accounts.clone())
    }

    async fn list_orders(&self, account_id: &AccountId) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .data
            .orders
            .iter()
            .filter(|o| &o.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, StoreError> {
        Ok(self
            .data
            .positions
            .iter()
            .filter(|p| &p.account_id == account_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderStatus, Symbol};
    use crate::tui::test_support::{account, order};
    use rust_decimal_macros::dec;

    fn position(account_id: &str, symbol: &str, qty: rust_decimal::Decimal) -> Position {
        Position {
            account_id: AccountId::new(account_id),
            symbol: Symbol::new(symbol),
            quantity: qty,
            avg_entry_price: dec!(100),
            current_price: dec!(101),
            market_value: qty * dec!(101),
            cost_basis: qty * dec!(100),
            unrealized_pl: qty,
            unrealized_pl_pct: dec!(0.01),
        }
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = InMemoryStore::new();
        assert!(store.list_accounts().await.unwrap().is_empty());
        assert!(
            store
                .list_orders(&AccountId::new("acct-1"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn listings_filter_by_account_and_keep_order() {
        let mut other = order("o-2", OrderStatus::New, dec!(0));
        other.account_id = AccountId::new("acct-2");
        let store = InMemoryStore::from_snapshot(StoreSnapshot {
            accounts: vec![account("A1", "PA1"), account("acct-2", "PA2")],
            orders: vec![
                order("o-3", OrderStatus::New, dec!(0)),
                other,
                order("o-1", OrderStatus::Filled, dec!(10)),
            ],
            positions: vec![
                position("A1", "AAPL", dec!(10)),
                position("acct-2", "MSFT", dec!(-3)),
            ],
        });

        let accounts = store.list_accounts().await.unwrap();
        let ids: Vec<_> = accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["A1", "acct-2"]);

        let orders = store.list_orders(&AccountId::new("A1")).await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.broker_order_id.as_str()).collect();
        assert_eq!(ids, ["o-3", "o-1"]);

        let positions = store
            .list_positions(&AccountId::new("acct-2"))
            .await
            .unwrap();
        assert_eq!(positions.len(), 1);
        assert!(positions[0].is_short());
    }

    #[test]
    fn snapshot_sections_default_to_empty() {
        let snapshot: StoreSnapshot = serde_json::from_str(r#"{"orders": []}"#).unwrap();
        assert_eq!(snapshot, StoreSnapshot::default());
    }
}
