//! Open position snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::{AccountId, Symbol};

/// Open position, identified by account and symbol.
///
/// Market value and P/L figures come from the data source as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Owning account.
    pub account_id: AccountId,
    /// Instrument.
    pub symbol: Symbol,
    /// Signed quantity; negative for short positions.
    pub quantity: Decimal,
    /// Average entry price.
    pub avg_entry_price: Decimal,
    /// Last traded price.
    pub current_price: Decimal,
    /// Market value.
    pub market_value: Decimal,
    /// Cost basis.
    pub cost_basis: Decimal,
    /// Unrealized profit or loss.
    pub unrealized_pl: Decimal,
    /// Unrealized profit or loss as a fraction of cost basis.
    pub unrealized_pl_pct: Decimal,
}

impl Position {
    /// True for short positions.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.quantity.is_sign_negative()
    }
}
