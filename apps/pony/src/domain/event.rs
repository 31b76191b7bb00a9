//! Events pushed by the broker stream.

use serde::{Deserialize, Serialize};

use super::{Account, Order};

/// Stream event carrying a full snapshot of the affected entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum BrokerEvent {
    /// An order changed.
    TradeUpdate(Order),
    /// An account changed.
    AccountUpdate(Account),
}

impl BrokerEvent {
    /// Static label for logging and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TradeUpdate(_) => "trade_update",
            Self::AccountUpdate(_) => "account_update",
        }
    }
}
