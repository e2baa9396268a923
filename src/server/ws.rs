//! WebSocket upgrade handler and per-connection message loop.
//!
//! Each connection runs two halves joined by a single-slot queue:
//!
//! ```text
//! reader ──(mpsc, capacity 1)──► worker ──► sink
//! ```
//!
//! The worker handles one message to completion before taking the next, so
//! replies leave in the order requests arrived. When the client goes away
//! the worker is aborted, cancelling any in-flight upstream call.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::RelayState;
use crate::core::ResultEnvelope;
use crate::core::chat::ChatLine;

/// What the reader hands the worker.
enum Inbound {
    Text(String),
    /// A frame that could not be decoded; still owed a reply.
    Undecodable(String),
}

pub(super) async fn ws_handler(
    State(state): State<RelayState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match upgrade {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, state)),
        Err(rejection) => {
            debug!("Rejected non-upgrade request: {}", rejection);
            (StatusCode::BAD_REQUEST, "Not a WebSocket request").into_response()
        }
    }
}

fn log_inbound(connection_id: Uuid, text: &str) {
    match ChatLine::parse(text) {
        Some(line) => info!(
            "[{}] Chat from {}: {:?}",
            connection_id, line.display_name, line.text
        ),
        None => info!("[{}] Received message: {:?}", connection_id, text),
    }
}

async fn handle_socket(socket: WebSocket, state: RelayState) {
    let connection_id = Uuid::new_v4();
    info!("[{}] WebSocket connected", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Inbound>(1);

    let mut worker = tokio::spawn(async move {
        while let Some(inbound) = rx.recv().await {
            let envelope = match inbound {
                Inbound::Text(text) => state.process(&text).await,
                Inbound::Undecodable(reason) => ResultEnvelope::failure(reason),
            };
            if sender
                .send(Message::Text(envelope.to_json().into()))
                .await
                .is_err()
            {
                warn!("[{}] Reply send failed: socket closed", connection_id);
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let inbound = match frame {
                    Some(Ok(Message::Text(text))) => {
                        let text = text.as_str().to_owned();
                        log_inbound(connection_id, &text);
                        Inbound::Text(text)
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => {
                            log_inbound(connection_id, &text);
                            Inbound::Text(text)
                        }
                        Err(e) => {
                            warn!("[{}] Binary frame is not UTF-8: {}", connection_id, e);
                            Inbound::Undecodable("message is not valid UTF-8".to_string())
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    // Ping/pong are answered by the transport.
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("[{}] WebSocket error: {}", connection_id, e);
                        break;
                    }
                };
                if tx.send(inbound).await.is_err() {
                    break;
                }
            }
            _ = &mut worker => break,
        }
    }

    drop(tx);
    worker.abort();
    info!("[{}] WebSocket disconnected", connection_id);
}
