//! Infrastructure Layer
//!
//! Adapters for the ports plus the process plumbing around the core.

pub mod alpaca;
pub mod config;
pub mod metrics;
pub mod mock;
pub mod store;
pub mod telemetry;
pub mod terminal;
