//! Application Layer
//!
//! - **Ports**: interfaces for the broker and the optional query store
//! - **Commands**: asynchronous work requested by the update function

pub mod commands;
pub mod ports;

pub use commands::{Command, CommandContext, CommandExecutor};
pub use ports::{BrokerError, BrokerPort, CommandMetrics, StoreError, StorePort};
