//! HTTP API module
//!
//! The presentation surface: timer commands, read-only views and an event stream.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(state_handler))
        .route("/toggle", post(toggle_handler))
        .route("/reset", post(reset_handler))
        .route("/skip", post(skip_handler))
        .route("/settings", post(save_settings_handler))
        .route("/settings/open", post(open_settings_handler))
        .route("/settings/draft", get(draft_handler))
        .route("/settings/cancel", post(cancel_settings_handler))
        .route("/alarm/test", post(alarm_test_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
