//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{Address, RecordedEvent};
use crate::service::FlashLoanService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<RecordedEvent>,
    service: Arc<FlashLoanService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(recorded) => {
                        if subs.matches(recorded.event.asset()) {
                            let msg = WsMessage::new(
                                uuid::Uuid::new_v4().to_string(),
                                WsMessageType::Event,
                                serde_json::to_value(&recorded).unwrap_or_default(),
                            );
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    service: &FlashLoanService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON")).ok();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { assets } => {
            let wildcard = assets.iter().any(|a| a == "*");
            let ids = parse_assets(&assets);
            subs.subscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { assets } => {
            let ids = parse_assets(&assets);
            subs.unsubscribe(&ids);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                }),
            )
        }
        WsCommand::GetBalance { asset } => match asset.parse::<Address>() {
            Ok(asset) => {
                let balance = service.balance_of(asset).await;
                WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "asset": asset,
                        "balance": balance.to_string(),
                    }),
                )
            }
            Err(e) => WsMessage::error(msg.id, 400, &e.to_string()),
        },
    };

    serde_json::to_string(&response).ok()
}

/// Parses asset addresses, skipping the wildcard and malformed entries.
fn parse_assets(assets: &[String]) -> Vec<Address> {
    assets
        .iter()
        .filter_map(|a| a.parse::<Address>().ok())
        .collect()
}
