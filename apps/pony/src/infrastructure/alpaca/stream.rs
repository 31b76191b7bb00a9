//! Trade Updates WebSocket Client
//!
//! Connects to Alpaca's trade updates stream and forwards every order
//! snapshot as a [`BrokerEvent::TradeUpdate`].
//!
//! # Protocol
//!
//! After connecting, send the `authenticate` action; once authorized send
//! `listen` for `trade_updates`. Frames arrive as text or binary JSON.
//!
//! There is no reconnection: any ending other than cancellation is returned
//! as an error so the session can surface it.

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::api_types::{ListenRequest, StreamMessage, TradeAuthRequest};
use super::config::AlpacaConfig;
use super::error::AlpacaError;
use crate::domain::{AccountId, BrokerEvent};

/// Trade updates stream client.
#[derive(Clone)]
pub struct TradeUpdatesStream {
    url: String,
    api_key: String,
    api_secret: String,
}

impl std::fmt::Debug for TradeUpdatesStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeUpdatesStream")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl TradeUpdatesStream {
    /// Create a client for the configured environment.
    #[must_use]
    pub fn new(config: &AlpacaConfig) -> Self {
        Self {
            url: config.stream_url().to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    /// Stream trade updates into `sink` until cancelled or the connection ends.
    ///
    /// Orders are attributed to `account_id`, since the wire payload does
    /// not carry one.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection fails, the credentials are
    /// refused, the server closes the socket or the sink is dropped.
    pub async fn run(
        &self,
        account_id: &AccountId,
        sink: &mpsc::Sender<BrokerEvent>,
        cancel: &CancellationToken,
    ) -> Result<(), AlpacaError> {
        tracing::info!(url = %self.url, "Connecting to trade updates stream");

        let ws_stream = tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            connected = tokio_tungstenite::connect_async(self.url.as_str()) => connected?.0,
        };
        let (mut write, mut read) = ws_stream.split();

        let auth = TradeAuthRequest::new(self.api_key.clone(), self.api_secret.clone());
        send_json(&mut write, &auth).await?;

        loop {
            let frame = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::info!("Trade updates stream cancelled");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                frame = read.next() => frame,
            };

            let event = match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_text(&text, account_id, &mut write).await?
                }
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => handle_text(text, account_id, &mut write).await?,
                    Err(_) => {
                        tracing::warn!(len = data.len(), "Received non-UTF8 binary message");
                        None
                    }
                },
                Some(Ok(Message::Ping(data))) => {
                    write.send(Message::Pong(data)).await?;
                    None
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map_or_else(
                        || "server closed the connection".to_string(),
                        |f| format!("server closed the connection: {} {}", f.code, f.reason),
                    );
                    tracing::info!(%reason, "Server sent close frame");
                    return Err(AlpacaError::StreamClosed(reason));
                }
                Some(Ok(_)) => None,
                Some(Err(e)) => return Err(e.into()),
                None => {
                    tracing::info!("WebSocket stream ended");
                    return Err(AlpacaError::StreamClosed("stream ended".to_string()));
                }
            };

            if let Some(event) = event {
                tokio::select! {
                    () = cancel.cancelled() => return Ok(()),
                    sent = sink.send(event) => {
                        if sent.is_err() {
                            return Err(AlpacaError::StreamClosed("event sink closed".to_string()));
                        }
                    }
                }
            }
        }
    }
}

async fn handle_text<W>(
    text: &str,
    account_id: &AccountId,
    write: &mut W,
) -> Result<Option<BrokerEvent>, AlpacaError>
where
    W: Sink<Message> + Unpin,
    W::Error: std::fmt::Display,
{
    let message = match serde_json::from_str::<StreamMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(error = %e, len = text.len(), "Ignoring unrecognised stream message");
            return Ok(None);
        }
    };

    match message {
        StreamMessage::Authorization(auth) => {
            if !auth.is_authorized() {
                return Err(AlpacaError::AuthenticationFailed(format!(
                    "trade updates stream: {}",
                    auth.status
                )));
            }
            tracing::info!("Trade updates authenticated");
            send_json(write, &ListenRequest::trade_updates()).await?;
            Ok(None)
        }
        StreamMessage::Listening(listening) => {
            if listening.streams.iter().any(|s| s == "trade_updates") {
                tracing::info!(streams = ?listening.streams, "Listening to trade updates");
            } else {
                tracing::warn!(streams = ?listening.streams, "Trade updates not in listening set");
            }
            Ok(None)
        }
        StreamMessage::TradeUpdate(update) => {
            let event_type = update.event;
            match update.order.into_order(account_id) {
                Ok(order) => {
                    tracing::debug!(
                        event = %event_type,
                        broker_order_id = %order.broker_order_id,
                        status = %order.status,
                        "Trade update received"
                    );
                    Ok(Some(BrokerEvent::TradeUpdate(order)))
                }
                Err(e) => {
                    tracing::warn!(event = %event_type, error = %e, "Dropping malformed trade update");
                    Ok(None)
                }
            }
        }
    }
}

async fn send_json<W, T>(write: &mut W, payload: &T) -> Result<(), AlpacaError>
where
    W: Sink<Message> + Unpin,
    W::Error: std::fmt::Display,
    T: serde::Serialize,
{
    let json = serde_json::to_string(payload).map_err(|e| AlpacaError::JsonParse(e.to_string()))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| AlpacaError::WebSocket(e.to_string()))
}
