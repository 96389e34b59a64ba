//! Relay WebSocket handler
//!
//! Each upgraded connection gets its own upstream session. The session is
//! opened after the upgrade, so a client whose session cannot be opened sees
//! the socket close without any message.

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use super::duplex::run_relay;
use crate::state::AppState;

/// Relay WebSocket handler
///
/// Upgrades the HTTP connection and relays text turns to the upstream
/// session and audio back to the client.
///
/// # Arguments
/// * `ws` - The WebSocket upgrade request from Axum
/// * `state` - Application state holding the upstream connector
///
/// # Returns
/// * `Response` - HTTP response that upgrades the connection to WebSocket
pub async fn relay_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let max_message_size = state.config.max_ws_message_size;

    ws.max_frame_size(max_message_size)
        .max_message_size(max_message_size)
        .on_upgrade(move |socket| {
            let connection_id = Uuid::new_v4();
            handle_relay_socket(socket, state)
                .instrument(info_span!("relay", %connection_id))
        })
}

/// Open the upstream session and run the relay until both sides finish.
async fn handle_relay_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");

    let session = match state.connector.connect().await {
        Ok(session) => session,
        Err(e) => {
            error!(
                provider = state.connector.provider_name(),
                "Failed to open upstream session: {}", e
            );
            if let Err(e) = socket.close().await {
                debug!("Client socket already closed: {}", e);
            }
            return;
        }
    };

    info!(
        provider = state.connector.provider_name(),
        "Upstream session opened"
    );

    let (client_tx, client_rx) = socket.split();
    let summary = run_relay(client_rx, client_tx, session).await;

    info!(
        texts = summary.client_to_upstream.forwarded,
        audio = summary.upstream_to_client.forwarded,
        "Client disconnected"
    );
}
