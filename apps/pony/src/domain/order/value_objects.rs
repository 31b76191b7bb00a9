//! Order enumerations: side, type, time-in-force and lifecycle status.
//!
//! `as_str` returns the broker wire spelling; `Display` the upper-case
//! label shown in tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::DomainError;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    /// Buy order.
    #[default]
    Buy,
    /// Sell order.
    Sell,
}

impl OrderSide {
    /// Wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// Next choice in the order-entry cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Previous choice in the order-entry cycle.
    #[must_use]
    pub const fn previous(self) -> Self {
        self.next()
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Execute at the best available price.
    #[default]
    Market,
    /// Execute at the limit price or better.
    Limit,
    /// Becomes a market order once the stop price trades.
    Stop,
    /// Becomes a limit order once the stop price trades.
    StopLimit,
}

impl OrderType {
    /// Wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::Stop => "stop",
            Self::StopLimit => "stop_limit",
        }
    }

    /// Whether a limit price is required.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }

    /// Whether a stop price is required.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, Self::Stop | Self::StopLimit)
    }

    /// Next choice in the order-entry cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Market => Self::Limit,
            Self::Limit => Self::Stop,
            Self::Stop => Self::StopLimit,
            Self::StopLimit => Self::Market,
        }
    }

    /// Previous choice in the order-entry cycle.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Market => Self::StopLimit,
            Self::Limit => Self::Market,
            Self::Stop => Self::Limit,
            Self::StopLimit => Self::Stop,
        }
    }
}

/// Time-in-force policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInForce {
    /// Valid for the current trading day.
    #[default]
    Day,
    /// Good till canceled.
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
}

impl TimeInForce {
    /// Wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Gtc => "gtc",
            Self::Ioc => "ioc",
            Self::Fok => "fok",
        }
    }

    /// Next choice in the order-entry cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Day => Self::Gtc,
            Self::Gtc => Self::Ioc,
            Self::Ioc => Self::Fok,
            Self::Fok => Self::Day,
        }
    }

    /// Previous choice in the order-entry cycle.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Day => Self::Fok,
            Self::Gtc => Self::Day,
            Self::Ioc => Self::Gtc,
            Self::Fok => Self::Ioc,
        }
    }
}

/// Order lifecycle status.
///
/// `New → PartiallyFilled → Filled`, or `→ Canceled | Rejected | Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted by the broker, nothing filled yet.
    #[default]
    New,
    /// Some quantity filled.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Canceled.
    Canceled,
    /// Rejected by the broker.
    Rejected,
    /// Expired (e.g. a day order at market close).
    Expired,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Canceled | Self::Rejected | Self::Expired
        )
    }

    /// Wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::Canceled => "canceled",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

macro_rules! impl_display_from_str {
    ($ty:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.as_str().to_uppercase())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase();
                $(
                    if normalized == Self::$variant.as_str() {
                        return Ok(Self::$variant);
                    }
                )+
                Err(DomainError::UnknownVariant {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

impl_display_from_str!(OrderSide, "order side", [Buy, Sell]);
impl_display_from_str!(OrderType, "order type", [Market, Limit, Stop, StopLimit]);
impl_display_from_str!(TimeInForce, "time in force", [Day, Gtc, Ioc, Fok]);
impl_display_from_str!(
    OrderStatus,
    "order status",
    [New, PartiallyFilled, Filled, Canceled, Rejected, Expired]
);
