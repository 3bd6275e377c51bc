//! WebSocket handler: the kiosk event channel.
//!
//! DESIGN
//! ======
//! On upgrade, generates a connection ID, registers an outbound queue with
//! the relay and enters a `select!` loop:
//! - Incoming text frames → decode → `Relay::handle`
//! - Queued events from the relay → encode → socket
//!
//! Decoding happens once, here. A frame that fails to decode is answered
//! with an `error` event to the sender only and otherwise ignored.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `connected` with `connectionId`
//! 2. Client sends events → relay routes them
//! 3. Close → `Relay::disconnect`

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use frames::Event;
use futures::{Sink, SinkExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::registry::Role;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    role: Role,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, Query(params): Query<WsParams>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state, params.role))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, role: Role) {
    let connection_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<Event>(state.config.client_channel_capacity);

    let welcome = state.relay.lock().await.connect(connection_id, role, client_tx);
    if send_event(&mut socket, &welcome).await.is_err() {
        state.relay.lock().await.disconnect(connection_id);
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies = process_inbound_text(&state, connection_id, text.as_str()).await;
                        if send_events(&mut socket, &replies).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    state.relay.lock().await.disconnect(connection_id);
    info!(%connection_id, "ws: connection closed");
}

/// Decode one inbound text frame and hand it to the relay. Returns events
/// for the sender only.
async fn process_inbound_text(state: &AppState, connection_id: Uuid, text: &str) -> Vec<Event> {
    let event = match frames::decode(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%connection_id, error = %e, code = e.error_code(), "ws: invalid inbound frame");
            return vec![Event::Error { code: e.error_code().to_owned(), message: e.to_string() }];
        }
    };
    state.relay.lock().await.handle(connection_id, event)
}

async fn send_event<S>(sink: &mut S, event: &Event) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    sink.send(Message::Text(frames::encode(event).into())).await
}

/// Send `events` in order, stopping at the first failed send.
async fn send_events<S>(sink: &mut S, events: &[Event]) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    for event in events {
        send_event(sink, event).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;
