//! Alpaca API request and response types.
//!
//! These types map directly to Alpaca's REST and trade-updates wire
//! formats. Prices and quantities travel as strings and are parsed into
//! `Decimal` on conversion; a value that does not parse fails the whole
//! conversion rather than defaulting to zero.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AlpacaError;
use crate::domain::{
    Account, AccountId, BrokerAccountId, BrokerOrderId, CreateOrderRequest, Order, OrderId,
    OrderSide, OrderStatus, OrderType, Position, Symbol, TimeInForce,
};

// ============================================================================
// Order Request Types
// ============================================================================

/// Order request for Alpaca API.
#[derive(Debug, Clone, Serialize)]
pub struct AlpacaOrderRequest {
    /// Stock symbol.
    pub symbol: String,
    /// Quantity (shares).
    pub qty: String,
    /// Order side.
    pub side: &'static str,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: &'static str,
    /// Time in force.
    pub time_in_force: &'static str,
    /// Limit price (for limit orders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    /// Stop price (for stop orders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    /// Client order ID.
    pub client_order_id: String,
}

impl From<&CreateOrderRequest> for AlpacaOrderRequest {
    fn from(request: &CreateOrderRequest) -> Self {
        Self {
            symbol: request.symbol.as_str().to_string(),
            qty: request.quantity.normalize().to_string(),
            side: request.side.as_str(),
            order_type: request.order_type.as_str(),
            time_in_force: request.time_in_force.as_str(),
            limit_price: request.limit_price.map(|p| p.normalize().to_string()),
            stop_price: request.stop_price.map(|p| p.normalize().to_string()),
            client_order_id: request.client_order_id.as_str().to_string(),
        }
    }
}

// ============================================================================
// Order Response Types
// ============================================================================

/// Order response from Alpaca API (also the `order` of a trade update).
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOrderResponse {
    /// Broker order ID.
    pub id: String,
    /// Client order ID.
    pub client_order_id: String,
    /// Symbol.
    pub symbol: String,
    /// Quantity (absent for notional orders).
    #[serde(default)]
    pub qty: Option<String>,
    /// Filled quantity.
    #[serde(default)]
    pub filled_qty: Option<String>,
    /// Average fill price.
    #[serde(default)]
    pub filled_avg_price: Option<String>,
    /// Order status.
    pub status: String,
    /// Order side.
    pub side: String,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: String,
    /// Time in force.
    pub time_in_force: String,
    /// Limit price.
    #[serde(default)]
    pub limit_price: Option<String>,
    /// Stop price.
    #[serde(default)]
    pub stop_price: Option<String>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Submitted timestamp.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Filled timestamp.
    #[serde(default)]
    pub filled_at: Option<DateTime<Utc>>,
    /// Canceled timestamp.
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
    /// Expired timestamp.
    #[serde(default)]
    pub expired_at: Option<DateTime<Utc>>,
}

impl AlpacaOrderResponse {
    /// Convert to a domain order owned by `account_id`.
    pub fn into_order(self, account_id: &AccountId) -> Result<Order, AlpacaError> {
        let quantity = parse_optional_decimal("qty", self.qty.as_deref())?.unwrap_or_default();
        let filled_quantity =
            parse_optional_decimal("filled_qty", self.filled_qty.as_deref())?.unwrap_or_default();

        Ok(Order {
            id: OrderId::new(self.client_order_id),
            broker_order_id: BrokerOrderId::new(self.id),
            account_id: account_id.clone(),
            symbol: Symbol::new(&self.symbol),
            side: parse_enum("side", &self.side)?,
            order_type: parse_order_type(&self.order_type)?,
            quantity,
            filled_quantity,
            limit_price: parse_optional_decimal("limit_price", self.limit_price.as_deref())?,
            stop_price: parse_optional_decimal("stop_price", self.stop_price.as_deref())?,
            time_in_force: parse_time_in_force(&self.time_in_force),
            status: parse_order_status(&self.status, filled_quantity),
            filled_avg_price: parse_optional_decimal(
                "filled_avg_price",
                self.filled_avg_price.as_deref(),
            )?,
            submitted_at: self.submitted_at,
            filled_at: self.filled_at,
            canceled_at: self.canceled_at,
            expired_at: self.expired_at,
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
        })
    }
}

// ============================================================================
// Account Types
// ============================================================================

/// Account response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAccountResponse {
    /// Account ID.
    pub id: String,
    /// Human-facing account number.
    pub account_number: String,
    /// Account status.
    pub status: String,
    /// Currency.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Cash balance.
    pub cash: String,
    /// Portfolio value.
    pub portfolio_value: String,
    /// Buying power.
    pub buying_power: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl TryFrom<AlpacaAccountResponse> for Account {
    type Error = AlpacaError;

    fn try_from(resp: AlpacaAccountResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccountId::new(resp.id),
            broker_account_id: BrokerAccountId::new(resp.account_number),
            status: resp.status,
            currency: resp.currency,
            cash: parse_decimal("cash", &resp.cash)?,
            portfolio_value: parse_decimal("portfolio_value", &resp.portfolio_value)?,
            buying_power: parse_decimal("buying_power", &resp.buying_power)?,
            created_at: resp.created_at,
            // The account resource carries no modification time.
            updated_at: resp.created_at,
        })
    }
}

// ============================================================================
// Position Types
// ============================================================================

/// Position response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPositionResponse {
    /// Symbol.
    pub symbol: String,
    /// Quantity.
    pub qty: String,
    /// Side (long/short).
    pub side: String,
    /// Average entry price.
    pub avg_entry_price: String,
    /// Market value.
    #[serde(default)]
    pub market_value: Option<String>,
    /// Cost basis.
    pub cost_basis: String,
    /// Current price.
    #[serde(default)]
    pub current_price: Option<String>,
    /// Unrealized P&L.
    #[serde(default)]
    pub unrealized_pl: Option<String>,
    /// Unrealized P&L percent.
    #[serde(default)]
    pub unrealized_plpc: Option<String>,
}

impl AlpacaPositionResponse {
    /// Convert to a domain position owned by `account_id`.
    pub fn into_position(self, account_id: &AccountId) -> Result<Position, AlpacaError> {
        let mut quantity = parse_decimal("qty", &self.qty)?;
        if self.side.eq_ignore_ascii_case("short") && quantity.is_sign_positive() {
            quantity = -quantity;
        }

        let optional = |field, value: Option<&str>| {
            parse_optional_decimal(field, value).map(Option::unwrap_or_default)
        };

        Ok(Position {
            account_id: account_id.clone(),
            symbol: Symbol::new(&self.symbol),
            quantity,
            avg_entry_price: parse_decimal("avg_entry_price", &self.avg_entry_price)?,
            current_price: optional("current_price", self.current_price.as_deref())?,
            market_value: optional("market_value", self.market_value.as_deref())?,
            cost_basis: parse_decimal("cost_basis", &self.cost_basis)?,
            unrealized_pl: optional("unrealized_pl", self.unrealized_pl.as_deref())?,
            unrealized_pl_pct: optional("unrealized_plpc", self.unrealized_plpc.as_deref())?,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code (numeric on the trading API).
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Error message.
    pub message: String,
}

impl AlpacaErrorResponse {
    /// Error code as text, if present.
    #[must_use]
    pub fn code_string(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(code) => Some(code.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// Trade Updates Stream Types
// ============================================================================

/// Authentication request for the trade updates stream.
#[derive(Debug, Clone, Serialize)]
pub struct TradeAuthRequest {
    /// Action: "authenticate"
    pub action: &'static str,
    /// Authentication data
    pub data: TradeAuthData,
}

/// Authentication data for the trade updates stream.
#[derive(Clone, Serialize)]
pub struct TradeAuthData {
    /// API key
    pub key_id: String,
    /// API secret
    pub secret_key: String,
}

impl std::fmt::Debug for TradeAuthData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeAuthData")
            .field("key_id", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl TradeAuthRequest {
    /// Build the authenticate action.
    #[must_use]
    pub const fn new(key_id: String, secret_key: String) -> Self {
        Self {
            action: "authenticate",
            data: TradeAuthData { key_id, secret_key },
        }
    }
}

/// Listen request for the trade updates stream.
#[derive(Debug, Clone, Serialize)]
pub struct ListenRequest {
    /// Action: "listen"
    pub action: &'static str,
    /// Listen data
    pub data: ListenData,
}

/// Listen data.
#[derive(Debug, Clone, Serialize)]
pub struct ListenData {
    /// Streams to listen to
    pub streams: Vec<String>,
}

impl ListenRequest {
    /// Listen to `trade_updates`.
    #[must_use]
    pub fn trade_updates() -> Self {
        Self {
            action: "listen",
            data: ListenData {
                streams: vec!["trade_updates".to_string()],
            },
        }
    }
}

/// Inbound stream message, keyed by its `stream` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "stream", content = "data")]
pub enum StreamMessage {
    /// Reply to the authenticate action.
    #[serde(rename = "authorization")]
    Authorization(AuthorizationData),
    /// Reply to the listen action.
    #[serde(rename = "listening")]
    Listening(ListeningData),
    /// An order event.
    #[serde(rename = "trade_updates")]
    TradeUpdate(Box<TradeUpdateData>),
}

/// Authorization reply.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationData {
    /// Status: "authorized" or "unauthorized"
    pub status: String,
    /// Action: "authenticate"
    #[serde(default)]
    pub action: String,
}

impl AuthorizationData {
    /// Check if authorization succeeded.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.status == "authorized"
    }
}

/// Listening reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ListeningData {
    /// List of active streams
    pub streams: Vec<String>,
}

/// Trade update payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeUpdateData {
    /// Event type (new, fill, partial_fill, canceled, ...).
    pub event: String,
    /// Order snapshot after the event.
    pub order: AlpacaOrderResponse,
    /// Event timestamp.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, AlpacaError> {
    Decimal::from_str(value.trim()).map_err(|_| AlpacaError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_optional_decimal(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<Decimal>, AlpacaError> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => parse_decimal(field, v).map(Some),
    }
}

fn parse_enum<T: FromStr>(field: &'static str, value: &str) -> Result<T, AlpacaError> {
    value.parse().map_err(|_| AlpacaError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Trailing stops have no domain counterpart; they display as stops.
fn parse_order_type(value: &str) -> Result<OrderType, AlpacaError> {
    if value.eq_ignore_ascii_case("trailing_stop") {
        return Ok(OrderType::Stop);
    }
    parse_enum("type", value)
}

/// Auction policies (`opg`, `cls`) and anything unknown read as day orders.
fn parse_time_in_force(value: &str) -> TimeInForce {
    value.parse().unwrap_or(TimeInForce::Day)
}

/// Parse Alpaca order status string to domain `OrderStatus`.
fn parse_order_status(status: &str, filled_qty: Decimal) -> OrderStatus {
    match status.to_lowercase().as_str() {
        "partially_filled" => OrderStatus::PartiallyFilled,
        "filled" => OrderStatus::Filled,
        "done_for_day" | "expired" => OrderStatus::Expired,
        "canceled" | "replaced" => OrderStatus::Canceled,
        "rejected" => OrderStatus::Rejected,
        // new, accepted, pending_*, stopped, suspended, calculated, and unknown
        _ if filled_qty > Decimal::ZERO => OrderStatus::PartiallyFilled,
        _ => OrderStatus::New,
    }
}
