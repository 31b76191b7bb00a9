//! Fixtures shared by the unit tests.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{
    Account, AccountId, BrokerAccountId, BrokerOrderId, Order, OrderId, OrderSide, OrderStatus,
    OrderType, Symbol, TimeInForce,
};

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 15, 30, 0)
        .single()
        .unwrap_or_default()
}

pub fn account(id: &str, broker_id: &str) -> Account {
    Account {
        id: AccountId::new(id),
        broker_account_id: BrokerAccountId::new(broker_id),
        status: "ACTIVE".to_string(),
        currency: "USD".to_string(),
        cash: dec!(10000),
        portfolio_value: dec!(25000.50),
        buying_power: dec!(20000),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn order(broker_id: &str, status: OrderStatus, filled: Decimal) -> Order {
    Order {
        id: OrderId::new(format!("client-{broker_id}")),
        broker_order_id: BrokerOrderId::new(broker_id),
        account_id: AccountId::new("A1"),
        symbol: Symbol::new("AAPL"),
        side: OrderSide::Buy,
        order_type: OrderType::Market,
        quantity: dec!(10),
        filled_quantity: filled,
        limit_price: None,
        stop_price: None,
        time_in_force: TimeInForce::Day,
        status,
        filled_avg_price: None,
        submitted_at: Some(timestamp()),
        filled_at: None,
        canceled_at: None,
        expired_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}
