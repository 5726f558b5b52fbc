//! `WebSocket` handler for real-time world-state streaming.
//!
//! Viewers connect to `GET /ws` and receive one JSON-encoded
//! [`WorldState`](sidequest_types::WorldState) document per broadcast
//! tick. The handler uses a [`broadcast::Receiver`] so all connected
//! viewers see the identical payload.
//!
//! The subscription channel carries no other in-band messaging: inbound
//! client frames are ignored apart from Ping (answered) and Close. If a
//! viewer falls behind, lagged payloads are silently skipped and the
//! viewer resumes from the most recent state.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;
use tracing::debug;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming world-state snapshots.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: subscribe to the broadcast channel
/// and forward each payload as a text frame.
///
/// Returning drops the receiver, which removes this viewer from the
/// broadcast registry; a send failure therefore deregisters the viewer
/// without touching anyone else.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!(viewers = state.viewer_count().saturating_add(1), "viewer connected");

    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            // Forward the next broadcast payload.
            result = rx.recv() => {
                match result {
                    Ok(payload) => {
                        let msg = Message::Text(payload.into());
                        if socket.send(msg).await.is_err() {
                            debug!("viewer disconnected (send failed)");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "viewer lagged, skipping to newest state");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("broadcast channel closed, ending stream");
                        return;
                    }
                }
            }
            // Watch for the viewer closing or pinging.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("viewer disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("viewer disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "viewer socket error");
                        return;
                    }
                    _ => {
                        // The stream is one-way: client text/binary frames
                        // are ignored.
                    }
                }
            }
        }
    }
}
