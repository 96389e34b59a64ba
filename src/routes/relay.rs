//! Relay WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::relay::relay_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the relay WebSocket router
///
/// # Endpoints
///
/// - `GET /` - WebSocket upgrade, the path browser clients connect to
/// - `GET /ws` - Same handler under an explicit path
///
/// # Example
///
/// ```json
/// // Client sends a turn
/// {"text": "hola"}
///
/// // Server streams audio fragments back
/// {"audio": "AQI="}
/// ```
pub fn create_relay_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(relay_handler))
        .route("/ws", get(relay_handler))
        .layer(TraceLayer::new_for_http())
}
