//! Brokerage account snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::{AccountId, BrokerAccountId};

/// Account summary as reported by the broker.
///
/// `status` is a free-form lifecycle label (e.g. `ACTIVE`); it is shown,
/// never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable account id.
    pub id: AccountId,
    /// Broker-assigned account id (reconciliation key).
    pub broker_account_id: BrokerAccountId,
    /// Lifecycle label.
    pub status: String,
    /// Account currency (ISO code).
    pub currency: String,
    /// Cash balance.
    pub cash: Decimal,
    /// Total portfolio value.
    pub portfolio_value: Decimal,
    /// Buying power.
    pub buying_power: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}
