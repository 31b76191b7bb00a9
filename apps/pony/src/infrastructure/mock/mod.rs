//! Mock broker for tests and demo mode.
//!
//! Serves accounts, orders and positions from memory and replays a scripted
//! list of events on subscription.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{BrokerError, BrokerPort};
use crate::domain::{
    Account, AccountId, BrokerAccountId, BrokerEvent, BrokerOrderId, CreateOrderRequest, Order,
    OrderId, OrderSide, OrderStatus, OrderType, Position, Symbol, TimeInForce,
};
use crate::infrastructure::store::StoreSnapshot;

/// Deterministic in-memory broker.
#[derive(Debug, Default)]
pub struct MockBroker {
    data: Mutex<StoreSnapshot>,
    script: Mutex<Vec<BrokerEvent>>,
    event_interval: Duration,
    stream_ending: Option<BrokerError>,
    next_failure: Mutex<Option<BrokerError>>,
    submitted: Mutex<Vec<CreateOrderRequest>>,
    order_seq: AtomicU64,
}

impl MockBroker {
    /// Create an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account.
    #[must_use]
    pub fn with_account(self, account: Account) -> Self {
        self.data.lock().accounts.push(account);
        self
    }

    /// Add an order.
    #[must_use]
    pub fn with_order(self, order: Order) -> Self {
        self.data.lock().orders.push(order);
        self
    }

    /// Add a position.
    #[must_use]
    pub fn with_position(self, position: Position) -> Self {
        self.data.lock().positions.push(position);
        self
    }

    /// Events replayed, in order, by each subscription.
    #[must_use]
    pub fn with_events(self, events: Vec<BrokerEvent>) -> Self {
        *self.script.lock() = events;
        self
    }

    /// Pause between scripted events.
    #[must_use]
    pub fn with_event_interval(mut self, interval: Duration) -> Self {
        self.event_interval = interval;
        self
    }

    /// End every subscription with `error` once the script is exhausted.
    ///
    /// Without this a subscription idles until cancelled.
    #[must_use]
    pub fn with_stream_ending(mut self, error: BrokerError) -> Self {
        self.stream_ending = Some(error);
        self
    }

    /// Fail the next `create_order` call with `error`.
    pub fn fail_next_order(&self, error: BrokerError) {
        *self.next_failure.lock() = Some(error);
    }

    /// Requests received by `create_order`, oldest first.
    #[must_use]
    pub fn submitted_orders(&self) -> Vec<CreateOrderRequest> {
        self.submitted.lock().clone()
    }

    /// A small paper account with a few orders, positions and a live script.
    #[must_use]
    pub fn demo() -> Self {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new("demo-account"),
            broker_account_id: BrokerAccountId::new("PA0DEMO0001"),
            status: "ACTIVE".to_string(),
            currency: "USD".to_string(),
            cash: Decimal::new(2_500_000, 2),
            portfolio_value: Decimal::new(4_012_550, 2),
            buying_power: Decimal::new(5_000_000, 2),
            created_at: now,
            updated_at: now,
        };

        let working = demo_order(
            &account.id,
            "demo-1",
            "AAPL",
            OrderSide::Buy,
            OrderType::Limit,
            Decimal::from(10),
            Some(Decimal::new(18_250, 2)),
        );
        let mut partial = demo_order(
            &account.id,
            "demo-2",
            "MSFT",
            OrderSide::Sell,
            OrderType::Market,
            Decimal::from(5),
            None,
        );
        partial.status = OrderStatus::PartiallyFilled;
        partial.filled_quantity = Decimal::from(2);
        partial.filled_avg_price = Some(Decimal::new(41_010, 2));

        let mut filling = working.clone();
        filling.status = OrderStatus::PartiallyFilled;
        filling.filled_quantity = Decimal::from(4);
        filling.filled_avg_price = Some(Decimal::new(18_249, 2));
        filling.updated_at = now + chrono::TimeDelta::seconds(1);

        let mut filled = filling.clone();
        filled.status = OrderStatus::Filled;
        filled.filled_quantity = Decimal::from(10);
        filled.filled_at = Some(now + chrono::TimeDelta::seconds(2));
        filled.updated_at = now + chrono::TimeDelta::seconds(2);

        let mut funded = account.clone();
        funded.cash = Decimal::new(2_317_500, 2);
        funded.updated_at = now + chrono::TimeDelta::seconds(2);

        Self::new()
            .with_account(account.clone())
            .with_order(working)
            .with_order(partial)
            .with_position(Position {
                account_id: account.id.clone(),
                symbol: Symbol::new("NVDA"),
                quantity: Decimal::from(12),
                avg_entry_price: Decimal::new(11_820, 2),
                current_price: Decimal::new(12_455, 2),
                market_value: Decimal::new(149_460, 2),
                cost_basis: Decimal::new(141_840, 2),
                unrealized_pl: Decimal::new(7_620, 2),
                unrealized_pl_pct: Decimal::new(537, 4),
            })
            .with_position(Position {
                account_id: account.id,
                symbol: Symbol::new("TSLA"),
                quantity: Decimal::from(-3),
                avg_entry_price: Decimal::new(24_100, 2),
                current_price: Decimal::new(24_510, 2),
                market_value: Decimal::new(-73_530, 2),
                cost_basis: Decimal::new(-72_300, 2),
                unrealized_pl: Decimal::new(-1_230, 2),
                unrealized_pl_pct: Decimal::new(-170, 4),
            })
            .with_events(vec![
                BrokerEvent::TradeUpdate(filling),
                BrokerEvent::TradeUpdate(filled),
                BrokerEvent::AccountUpdate(funded),
            ])
            .with_event_interval(Duration::from_secs(3))
    }
}

fn demo_order(
    account_id: &AccountId,
    broker_id: &str,
    symbol: &str,
    side: OrderSide,
    order_type: OrderType,
    quantity: Decimal,
    limit_price: Option<Decimal>,
) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId::new(format!("client-{broker_id}")),
        broker_order_id: BrokerOrderId::new(broker_id),
        account_id: account_id.clone(),
        symbol: Symbol::new(symbol),
        side,
        order_type,
        quantity,
        filled_quantity: Decimal::ZERO,
        limit_price,
        stop_price: None,
        time_in_force: TimeInForce::Day,
        status: OrderStatus::New,
        filled_avg_price: None,
        submitted_at: Some(now),
        filled_at: None,
        canceled_at: None,
        expired_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl BrokerPort for MockBroker {
    async fn get_account(&self, account_id: &AccountId) -> Result<Account, BrokerError> {
        self.data
            .lock()
            .accounts
            .iter()
            .find(|a| &a.id == account_id)
            .cloned()
            .ok_or_else(|| BrokerError::NotFound {
                resource: format!("account {account_id}"),
            })
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, BrokerError> {
        Ok(self.data.lock().accounts.clone())
    }

    async fn list_orders(&self, account_id: &AccountId) -> Result<Vec<Order>, BrokerError> {
        Ok(self
            .data
            .lock()
            .orders
            .iter()
            .filter(|o| &o.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, BrokerError> {
        self.submitted.lock().push(request.clone());
        if let Some(error) = self.next_failure.lock().take() {
            return Err(error);
        }

        let seq = self.order_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let order = Order {
            id: request.client_order_id,
            broker_order_id: BrokerOrderId::new(format!("mock-{seq}")),
            account_id: request.account_id,
            symbol: request.symbol,
            side: request.side,
            order_type: request.order_type,
            quantity: request.quantity,
            filled_quantity: Decimal::ZERO,
            limit_price: request.limit_price,
            stop_price: request.stop_price,
            time_in_force: request.time_in_force,
            status: OrderStatus::New,
            filled_avg_price: None,
            submitted_at: Some(now),
            filled_at: None,
            canceled_at: None,
            expired_at: None,
            created_at: now,
            updated_at: now,
        };
        self.data.lock().orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, broker_order_id: &BrokerOrderId) -> Result<Order, BrokerError> {
        self.data
            .lock()
            .orders
            .iter()
            .find(|o| &o.broker_order_id == broker_order_id)
            .cloned()
            .ok_or_else(|| BrokerError::NotFound {
                resource: format!("order {broker_order_id}"),
            })
    }

    async fn cancel_order(&self, broker_order_id: &BrokerOrderId) -> Result<(), BrokerError> {
        let mut data = self.data.lock();
        let order = data
            .orders
            .iter_mut()
            .find(|o| &o.broker_order_id == broker_order_id)
            .ok_or_else(|| BrokerError::NotFound {
                resource: format!("order {broker_order_id}"),
            })?;
        if order.status.is_terminal() {
            return Err(BrokerError::Rejected {
                reason: format!("order is {}", order.status),
            });
        }
        let now = Utc::now();
        order.status = OrderStatus::Canceled;
        order.canceled_at = Some(now);
        order.updated_at = now;
        Ok(())
    }

    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, BrokerError> {
        Ok(self
            .data
            .lock()
            .positions
            .iter()
            .filter(|p| &p.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn subscribe_events(
        &self,
        account_id: Option<AccountId>,
        sink: mpsc::Sender<BrokerEvent>,
        cancel: CancellationToken,
    ) -> Result<(), BrokerError> {
        let script = self.script.lock().clone();
        tracing::info!(
            account_id = ?account_id,
            events = script.len(),
            "Mock subscription started"
        );

        for event in script {
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                () = tokio::time::sleep(self.event_interval) => {}
            }
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                sent = sink.send(event) => {
                    if sent.is_err() {
                        return Err(BrokerError::StreamClosed {
                            reason: "event sink closed".to_string(),
                        });
                    }
                }
            }
        }

        match &self.stream_ending {
            Some(error) => Err(error.clone()),
            None => {
                cancel.cancelled().await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::{account, order};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn create_order_assigns_broker_ids() {
        let broker = MockBroker::new();
        let request = CreateOrderRequest::market(
            AccountId::new("A1"),
            Symbol::new("AAPL"),
            OrderSide::Buy,
            dec!(3),
        );

        let first = broker.create_order(request.clone()).await.unwrap();
        let second = broker.create_order(request.clone()).await.unwrap();

        assert_eq!(first.broker_order_id.as_str(), "mock-1");
        assert_eq!(second.broker_order_id.as_str(), "mock-2");
        assert_eq!(first.id, request.client_order_id);
        assert_eq!(first.status, OrderStatus::New);
        assert_eq!(broker.submitted_orders().len(), 2);
        assert_eq!(
            broker.list_orders(&AccountId::new("A1")).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn fail_next_order_fails_once() {
        let broker = MockBroker::new();
        broker.fail_next_order(BrokerError::Rejected {
            reason: "insufficient buying power".to_string(),
        });
        let request = CreateOrderRequest::market(
            AccountId::new("A1"),
            Symbol::new("AAPL"),
            OrderSide::Buy,
            dec!(3),
        );

        assert!(broker.create_order(request.clone()).await.is_err());
        assert!(broker.create_order(request).await.is_ok());
    }

    #[tokio::test]
    async fn cancel_rejects_terminal_orders() {
        let broker = MockBroker::new()
            .with_order(order("o-1", OrderStatus::New, dec!(0)))
            .with_order(order("o-2", OrderStatus::Filled, dec!(10)));

        broker.cancel_order(&BrokerOrderId::new("o-1")).await.unwrap();
        let canceled = broker.get_order(&BrokerOrderId::new("o-1")).await.unwrap();
        assert_eq!(canceled.status, OrderStatus::Canceled);

        let err = broker
            .cancel_order(&BrokerOrderId::new("o-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::Rejected { .. }));
        assert!(matches!(
            broker.cancel_order(&BrokerOrderId::new("nope")).await,
            Err(BrokerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn subscription_replays_script_then_ends() {
        let filled = order("o-1", OrderStatus::Filled, dec!(10));
        let broker = MockBroker::new()
            .with_events(vec![
                BrokerEvent::TradeUpdate(filled.clone()),
                BrokerEvent::AccountUpdate(account("A1", "PA1")),
            ])
            .with_stream_ending(BrokerError::StreamClosed {
                reason: "bye".to_string(),
            });
        let (tx, mut rx) = mpsc::channel(8);

        let result = broker
            .subscribe_events(None, tx, CancellationToken::new())
            .await;

        assert_eq!(
            result,
            Err(BrokerError::StreamClosed {
                reason: "bye".to_string()
            })
        );
        assert_eq!(rx.recv().await, Some(BrokerEvent::TradeUpdate(filled)));
        assert!(matches!(rx.recv().await, Some(BrokerEvent::AccountUpdate(_))));
    }

    #[tokio::test]
    async fn cancellation_ends_subscription_cleanly() {
        let broker = MockBroker::new();
        let (tx, _rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(broker.subscribe_events(None, tx, cancel).await, Ok(()));
    }

    #[tokio::test]
    async fn demo_data_is_consistent() {
        let broker = MockBroker::demo();
        let accounts = broker.list_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);

        let orders = broker.list_orders(&accounts[0].id).await.unwrap();
        let positions = broker.list_positions(&accounts[0].id).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(positions.len(), 2);
        assert!(positions.iter().any(Position::is_short));
    }
}
