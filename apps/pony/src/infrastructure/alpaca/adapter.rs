//! Alpaca broker adapter implementing `BrokerPort`.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{BrokerError, BrokerPort};
use crate::domain::{
    Account, AccountId, BrokerEvent, BrokerOrderId, CreateOrderRequest, Order, OrderId, Position,
};
use crate::infrastructure::config::Environment;

use super::api_types::{
    AlpacaAccountResponse, AlpacaOrderRequest, AlpacaOrderResponse, AlpacaPositionResponse,
};
use super::config::AlpacaConfig;
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;
use super::stream::TradeUpdatesStream;

/// Most orders the trading API returns in one listing.
const ORDER_PAGE_LIMIT: u32 = 500;

/// Alpaca Markets broker adapter.
///
/// The trading API exposes exactly one account per key pair; its id is
/// cached on first sight so order payloads (which carry none) can be
/// attributed to it.
#[derive(Debug, Clone)]
pub struct AlpacaBrokerAdapter {
    client: AlpacaHttpClient,
    stream: TradeUpdatesStream,
    environment: Environment,
    account_id: Arc<RwLock<Option<AccountId>>>,
}

impl AlpacaBrokerAdapter {
    /// Create a new Alpaca broker adapter.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        Ok(Self {
            client: AlpacaHttpClient::new(config)?,
            stream: TradeUpdatesStream::new(config),
            environment: config.environment,
            account_id: Arc::new(RwLock::new(None)),
        })
    }

    /// Check if we're in live trading mode.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.environment.is_live()
    }

    async fn fetch_account(&self) -> Result<Account, BrokerError> {
        let response: AlpacaAccountResponse = self.client.get("/v2/account").await?;
        let account = Account::try_from(response)?;
        *self.account_id.write() = Some(account.id.clone());
        Ok(account)
    }

    /// Look up an order by the id we submitted it under. `None` when the
    /// broker never recorded it.
    async fn find_by_client_order_id(
        &self,
        client_order_id: &OrderId,
    ) -> Result<Option<AlpacaOrderResponse>, AlpacaError> {
        let path = format!("/v2/orders:by_client_order_id?client_order_id={client_order_id}");
        match self.client.get(&path).await {
            Ok(response) => Ok(Some(response)),
            Err(AlpacaError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn resolve_account_id(&self) -> Result<AccountId, BrokerError> {
        let cached = self.account_id.read().clone();
        match cached {
            Some(id) => Ok(id),
            None => self.fetch_account().await.map(|account| account.id),
        }
    }
}

#[async_trait]
impl BrokerPort for AlpacaBrokerAdapter {
    async fn get_account(&self, account_id: &AccountId) -> Result<Account, BrokerError> {
        let account = self.fetch_account().await?;
        if &account.id != account_id {
            return Err(BrokerError::NotFound {
                resource: format!("account {account_id}"),
            });
        }
        Ok(account)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, BrokerError> {
        let account = self.fetch_account().await?;
        tracing::debug!(account_id = %account.id, "Loaded Alpaca account");
        Ok(vec![account])
    }

    async fn list_orders(&self, account_id: &AccountId) -> Result<Vec<Order>, BrokerError> {
        let responses: Vec<AlpacaOrderResponse> = self
            .client
            .get(&format!("/v2/orders?status=all&limit={ORDER_PAGE_LIMIT}"))
            .await?;

        let orders = responses
            .into_iter()
            .map(|r| r.into_order(account_id))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(%account_id, count = orders.len(), "Loaded orders");
        Ok(orders)
    }

    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, BrokerError> {
        if self.is_live() {
            tracing::warn!(
                client_order_id = %request.client_order_id,
                symbol = %request.symbol,
                "Submitting LIVE order - this will execute real trades"
            );
        }

        let alpaca_request = AlpacaOrderRequest::from(&request);

        tracing::info!(
            client_order_id = %request.client_order_id,
            symbol = %request.symbol,
            side = alpaca_request.side,
            order_type = alpaca_request.order_type,
            qty = %alpaca_request.qty,
            limit_price = ?alpaca_request.limit_price,
            stop_price = ?alpaca_request.stop_price,
            "Submitting order to Alpaca"
        );

        let response: AlpacaOrderResponse =
            match self.client.post("/v2/orders", &alpaca_request).await {
                Ok(response) => response,
                Err(AlpacaError::Unconfirmed(reason)) => {
                    tracing::warn!(
                        client_order_id = %request.client_order_id,
                        %reason,
                        "Order submission unconfirmed, looking it up"
                    );
                    self.find_by_client_order_id(&request.client_order_id)
                        .await?
                        .ok_or(BrokerError::Connection { message: reason })?
                }
                Err(e) => return Err(e.into()),
            };

        tracing::info!(
            client_order_id = %request.client_order_id,
            broker_order_id = %response.id,
            status = %response.status,
            "Order submitted successfully"
        );

        Ok(response.into_order(&request.account_id)?)
    }

    async fn get_order(&self, broker_order_id: &BrokerOrderId) -> Result<Order, BrokerError> {
        let account_id = self.resolve_account_id().await?;
        let response: AlpacaOrderResponse = self
            .client
            .get(&format!("/v2/orders/{broker_order_id}"))
            .await?;
        Ok(response.into_order(&account_id)?)
    }

    async fn cancel_order(&self, broker_order_id: &BrokerOrderId) -> Result<(), BrokerError> {
        tracing::info!(%broker_order_id, "Canceling order");
        self.client
            .delete(&format!("/v2/orders/{broker_order_id}"))
            .await
            .map_err(BrokerError::from)
    }

    async fn list_positions(&self, account_id: &AccountId) -> Result<Vec<Position>, BrokerError> {
        let responses: Vec<AlpacaPositionResponse> = self.client.get("/v2/positions").await?;
        let positions = responses
            .into_iter()
            .map(|r| r.into_position(account_id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(positions)
    }

    async fn subscribe_events(
        &self,
        account_id: Option<AccountId>,
        sink: mpsc::Sender<BrokerEvent>,
        cancel: CancellationToken,
    ) -> Result<(), BrokerError> {
        let account_id = match account_id {
            Some(id) => id,
            None => self.resolve_account_id().await?,
        };
        self.stream
            .run(&account_id, &sink, &cancel)
            .await
            .map_err(BrokerError::from)
    }
}
