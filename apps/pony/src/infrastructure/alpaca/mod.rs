//! Alpaca Markets Broker Adapter
//!
//! Implementation of `BrokerPort` for the Alpaca trading API:
//! - REST calls with retry and exponential backoff
//! - Trade updates WebSocket for live order snapshots
//! - Paper vs live endpoints

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;
mod stream;

pub use adapter::AlpacaBrokerAdapter;
pub use config::{AlpacaConfig, RetryConfig};
pub use error::AlpacaError;
pub use stream::TradeUpdatesStream;
