//! Commands: one unit of asynchronous work each, finishing in one message.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::ports::{BrokerPort, StorePort};
use crate::domain::{AccountId, BrokerEvent, CreateOrderRequest};
use crate::tui::{AppError, Message};

/// Work requested by the update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List accounts.
    LoadAccounts,
    /// List orders of one account.
    LoadOrders(AccountId),
    /// List positions of one account.
    LoadPositions(AccountId),
    /// Open the event subscription for the session.
    SubscribeEvents(Option<AccountId>),
    /// Submit an order.
    PlaceOrder(CreateOrderRequest),
    /// End the session.
    Quit,
}

impl Command {
    /// Startup batch.
    #[must_use]
    pub fn initial() -> Vec<Self> {
        vec![Self::LoadAccounts, Self::SubscribeEvents(None)]
    }

    /// Static label for logging and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LoadAccounts => "load_accounts",
            Self::LoadOrders(_) => "load_orders",
            Self::LoadPositions(_) => "load_positions",
            Self::SubscribeEvents(_) => "subscribe_events",
            Self::PlaceOrder(_) => "place_order",
            Self::Quit => "quit",
        }
    }

    /// Run the command to completion.
    ///
    /// Returns `None` only for `Quit`, which the runtime handles itself.
    pub async fn run(self, ctx: &CommandContext) -> Option<Message> {
        let message = match self {
            Self::LoadAccounts => ctx.load_accounts().await,
            Self::LoadOrders(account_id) => ctx.load_orders(&account_id).await,
            Self::LoadPositions(account_id) => ctx.load_positions(&account_id).await,
            Self::SubscribeEvents(account_id) => ctx.subscribe(account_id).await,
            Self::PlaceOrder(request) => match ctx.broker.create_order(request).await {
                Ok(order) => Message::OrderPlaced(order),
                Err(err) => Message::Error(err.into()),
            },
            Self::Quit => return None,
        };
        Some(message)
    }
}

/// Collaborators a command may use.
///
/// Load commands read from the store when one is configured, otherwise
/// from the broker.
#[derive(Clone)]
pub struct CommandContext {
    broker: Arc<dyn BrokerPort>,
    store: Option<Arc<dyn StorePort>>,
    sender: mpsc::Sender<Message>,
    cancel: CancellationToken,
    event_buffer: usize,
}

impl CommandContext {
    /// Create a context.
    #[must_use]
    pub fn new(
        broker: Arc<dyn BrokerPort>,
        store: Option<Arc<dyn StorePort>>,
        sender: mpsc::Sender<Message>,
        cancel: CancellationToken,
    ) -> Self {
        let event_buffer = sender.max_capacity();
        Self {
            broker,
            store,
            sender,
            cancel,
            event_buffer,
        }
    }

    /// Session cancellation token.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Channel the runtime consumes.
    #[must_use]
    pub const fn sender(&self) -> &mpsc::Sender<Message> {
        &self.sender
    }

    async fn load_accounts(&self) -> Message {
        let result = match &self.store {
            Some(store) => store.list_accounts().await.map_err(AppError::from),
            None => self.broker.list_accounts().await.map_err(AppError::from),
        };
        result.map_or_else(Message::Error, Message::AccountsLoaded)
    }

    async fn load_orders(&self, account_id: &AccountId) -> Message {
        let result = match &self.store {
            Some(store) => store.list_orders(account_id).await.map_err(AppError::from),
            None => self.broker.list_orders(account_id).await.map_err(AppError::from),
        };
        result.map_or_else(Message::Error, Message::OrdersLoaded)
    }

    async fn load_positions(&self, account_id: &AccountId) -> Message {
        let result = match &self.store {
            Some(store) => store.list_positions(account_id).await.map_err(AppError::from),
            None => self.broker.list_positions(account_id).await.map_err(AppError::from),
        };
        result.map_or_else(Message::Error, Message::PositionsLoaded)
    }

    /// Forward broker events as messages until the subscription ends.
    ///
    /// Every forwarded event reaches the channel before the termination
    /// message does.
    async fn subscribe(&self, account_id: Option<AccountId>) -> Message {
        let (event_tx, mut event_rx) = mpsc::channel::<BrokerEvent>(self.event_buffer);
        let sender = self.sender.clone();

        let forwarder = tokio::spawn(async move {
            let mut forwarded = 0u64;
            while let Some(event) = event_rx.recv().await {
                debug!(kind = event.kind(), "Forwarding broker event");
                if sender.send(Message::Stream(event)).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            forwarded
        });

        info!(account_id = ?account_id, "Subscribing to broker events");
        let result = self
            .broker
            .subscribe_events(account_id, event_tx, self.cancel.child_token())
            .await;

        let forwarded = forwarder.await.unwrap_or_else(|e| {
            warn!(error = %e, "Event forwarder task failed");
            0
        });

        let reason = match result {
            Ok(()) => "subscription cancelled".to_string(),
            Err(err) => err.to_string(),
        };
        warn!(forwarded, reason = %reason, "Broker event subscription ended");
        Message::Error(AppError::StreamTerminated(reason))
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("store", &self.store.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_batch_loads_accounts_and_subscribes() {
        assert_eq!(
            Command::initial(),
            vec![Command::LoadAccounts, Command::SubscribeEvents(None)]
        );
    }

    #[test]
    fn command_kinds_are_distinct() {
        let kinds = [
            Command::LoadAccounts.kind(),
            Command::LoadOrders(AccountId::new("A")).kind(),
            Command::LoadPositions(AccountId::new("A")).kind(),
            Command::SubscribeEvents(None).kind(),
            Command::Quit.kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
