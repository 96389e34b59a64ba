use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod api;
pub mod relay;

/// Combine all routes into the application router
pub fn create_app(state: Arc<AppState>) -> Router {
    api::create_api_router()
        .merge(relay::create_relay_router())
        .with_state(state)
}
