//! Domain Layer - Account, order and position value types.
//!
//! Pure data with identity keys and lifecycle fields. Nothing in here
//! performs I/O; reconciliation rules live in [`crate::tui`].

/// Identifiers and errors shared by every entity.
pub mod shared;

/// Brokerage account snapshot.
pub mod account;

/// Orders, order enumerations and order creation requests.
pub mod order;

/// Open positions.
pub mod position;

/// Events pushed by the broker stream.
pub mod event;

pub use account::Account;
pub use event::BrokerEvent;
pub use order::{CreateOrderRequest, Order, OrderSide, OrderStatus, OrderType, TimeInForce};
pub use position::Position;
pub use shared::{AccountId, BrokerAccountId, BrokerOrderId, DomainError, OrderId, Symbol};
