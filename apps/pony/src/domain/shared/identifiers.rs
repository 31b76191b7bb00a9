//! Strongly-typed identifiers for accounts, orders and instruments.
//!
//! Every entity carries two identities: the id this terminal uses
//! internally and the id the broker assigned. Stream reconciliation is
//! keyed on the broker-assigned one, so the types keep them apart.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(AccountId, "Stable account identifier (terminal side).");
define_id!(
    BrokerAccountId,
    "Broker-assigned account identifier; the reconciliation key for account updates."
);
define_id!(OrderId, "Internal order identifier, sent to the broker as the client order id.");
define_id!(
    BrokerOrderId,
    "Broker-assigned order identifier; the reconciliation key for trade updates."
);

impl OrderId {
    /// Generate a new unique order id using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Ticker symbol, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, trimming whitespace and upper-casing.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_uppercase())
    }

    /// Get the ticker string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the symbol has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_generate_is_unique() {
        let id1 = OrderId::generate();
        let id2 = OrderId::generate();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
    }

    #[test]
    fn broker_ids_compare_by_value() {
        assert_eq!(BrokerOrderId::new("O1"), BrokerOrderId::from("O1"));
        assert_ne!(BrokerOrderId::new("O1"), BrokerOrderId::new("O2"));
    }

    #[test]
    fn account_id_display_and_into_inner() {
        let id = AccountId::new("A1");
        assert_eq!(format!("{id}"), "A1");
        assert_eq!(id.into_inner(), "A1");
    }

    #[test]
    fn symbol_is_upper_cased_and_trimmed() {
        assert_eq!(Symbol::new(" aapl ").as_str(), "AAPL");
        assert!(Symbol::new("  ").is_empty());
    }

    #[test]
    fn identifiers_serialize_transparently() {
        let json = serde_json::to_string(&BrokerOrderId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");

        let symbol: Symbol = serde_json::from_str("\"MSFT\"").unwrap();
        assert_eq!(symbol, Symbol::new("MSFT"));
    }
}
