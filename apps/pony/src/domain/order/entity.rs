//! Order snapshot and order creation request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{OrderSide, OrderStatus, OrderType, TimeInForce};
use crate::domain::shared::{AccountId, BrokerOrderId, DomainError, OrderId, Symbol};

/// Full order snapshot.
///
/// Orders are never patched field by field: every update replaces the whole
/// record, matched on `broker_order_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Internal id (client order id).
    pub id: OrderId,
    /// Broker-assigned id (reconciliation key).
    pub broker_order_id: BrokerOrderId,
    /// Owning account.
    pub account_id: AccountId,
    /// Instrument.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Requested quantity.
    pub quantity: Decimal,
    /// Quantity filled so far.
    pub filled_quantity: Decimal,
    /// Limit price, for limit and stop-limit orders.
    pub limit_price: Option<Decimal>,
    /// Stop price, for stop and stop-limit orders.
    pub stop_price: Option<Decimal>,
    /// Time-in-force policy.
    pub time_in_force: TimeInForce,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Average fill price, once something filled.
    pub filled_avg_price: Option<Decimal>,
    /// When the order reached the broker.
    pub submitted_at: Option<DateTime<Utc>>,
    /// When the order completely filled.
    pub filled_at: Option<DateTime<Utc>>,
    /// When the order was canceled.
    pub canceled_at: Option<DateTime<Utc>>,
    /// When the order expired.
    pub expired_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// True when the snapshot reports more filled than requested.
    ///
    /// Only used for diagnostics; snapshots are applied as received.
    #[must_use]
    pub fn is_overfilled(&self) -> bool {
        self.filled_quantity > self.quantity
    }
}

/// Request to create a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Client order id to attach to the submission.
    pub client_order_id: OrderId,
    /// Account to trade in.
    pub account_id: AccountId,
    /// Instrument.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Quantity.
    pub quantity: Decimal,
    /// Limit price.
    pub limit_price: Option<Decimal>,
    /// Stop price.
    pub stop_price: Option<Decimal>,
    /// Time-in-force.
    pub time_in_force: TimeInForce,
}

impl CreateOrderRequest {
    /// Create a market order request with a fresh client order id.
    #[must_use]
    pub fn market(
        account_id: AccountId,
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            client_order_id: OrderId::generate(),
            account_id,
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            limit_price: None,
            stop_price: None,
            time_in_force: TimeInForce::Day,
        }
    }

    /// Create a limit order request with a fresh client order id.
    #[must_use]
    pub fn limit(
        account_id: AccountId,
        symbol: Symbol,
        side: OrderSide,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            ..Self::market(account_id, symbol, side, quantity)
        }
    }

    /// Set the time-in-force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Check the request is well formed before it goes to the broker.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.symbol.is_empty() {
            return Err(DomainError::MissingField { field: "symbol" });
        }
        if self.quantity <= Decimal::ZERO {
            return Err(DomainError::NotPositive {
                field: "quantity",
                value: self.quantity,
            });
        }

        check_price("limit price", self.limit_price, self.order_type.requires_limit_price())?;
        check_price("stop price", self.stop_price, self.order_type.requires_stop_price())?;

        Ok(())
    }
}

fn check_price(
    field: &'static str,
    price: Option<Decimal>,
    required: bool,
) -> Result<(), DomainError> {
    match price {
        None if required => Err(DomainError::MissingField { field }),
        Some(value) if value <= Decimal::ZERO => Err(DomainError::NotPositive { field, value }),
        _ => Ok(()),
    }
}
