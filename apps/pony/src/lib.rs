// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::significant_drop_tightening
    )
)]

//! Pony - Terminal Brokerage Dashboard
//!
//! Interactive terminal dashboard for a brokerage trading account: account
//! summary, orders, positions, an order entry form, and live reconciliation
//! of order and account snapshots pushed by the broker.
//!
//! # Architecture (inside → outside)
//!
//! - **Domain**: value types (accounts, orders, positions, events) and
//!   strongly-typed identifiers. No I/O.
//! - **Application**: ports (`BrokerPort`, `StorePort`), the command layer
//!   and the executor that runs commands on the tokio runtime.
//! - **TUI core**: messages, state, views, order entry and the pure
//!   `update` function that reconciles everything into one state.
//! - **Infrastructure**: Alpaca REST and trade-updates adapters, stores,
//!   configuration, telemetry, metrics and the terminal shell.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - value types with no external dependencies.
pub mod domain;

/// Application layer - ports, commands and the executor.
pub mod application;

/// TUI core - state machine and reconciliation.
pub mod tui;

/// Infrastructure layer - adapters and process plumbing.
pub mod infrastructure;

pub use application::{
    BrokerError, BrokerPort, Command, CommandContext, CommandExecutor, CommandMetrics, StoreError,
    StorePort,
};
pub use domain::{
    Account, AccountId, BrokerAccountId, BrokerEvent, BrokerOrderId, CreateOrderRequest,
    DomainError, Order, OrderId, OrderSide, OrderStatus, OrderType, Position, Symbol,
    TimeInForce,
};
pub use infrastructure::config::{AppConfig, BrokerKind, ConfigError, Environment};
pub use tui::{AppError, AppState, Key, Message, View, init, update};
