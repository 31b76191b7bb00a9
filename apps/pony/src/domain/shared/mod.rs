//! Shared Domain Types
//!
//! Identifiers and validation errors shared across entities.

mod errors;
mod identifiers;

pub use errors::DomainError;
pub use identifiers::{AccountId, BrokerAccountId, BrokerOrderId, OrderId, Symbol};
