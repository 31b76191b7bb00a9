//! Domain validation errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation failure for a domain value (e.g. a malformed order request).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required field was left empty.
    #[error("{field} is required")]
    MissingField {
        /// Field name as shown to the user.
        field: &'static str,
    },

    /// A numeric field could not be parsed as a decimal.
    #[error("{field} is not a valid number: '{input}'")]
    InvalidNumber {
        /// Field name as shown to the user.
        field: &'static str,
        /// Raw text that failed to parse.
        input: String,
    },

    /// A numeric field must be strictly positive.
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive {
        /// Field name as shown to the user.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// No account is selected, so there is nothing to trade against.
    #[error("no account selected")]
    NoAccountSelected,

    /// An enumeration value was not recognised.
    #[error("unknown {kind}: '{value}'")]
    UnknownVariant {
        /// Enumeration name.
        kind: &'static str,
        /// Unrecognised text.
        value: String,
    },
}
