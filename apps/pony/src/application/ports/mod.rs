//! Application Ports (Driven)
//!
//! Interfaces the command layer uses to reach external systems and to
//! report what it did.

mod broker_port;
mod metrics_port;
mod store_port;

pub use broker_port::{BrokerError, BrokerPort};
pub use metrics_port::{CommandMetrics, NoMetrics};
pub use store_port::{StoreError, StorePort};
