//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::state::{AppState, CommandError, DraftSettings, SettingsError, TimerView};
use super::responses::{
    AlarmTestRequest, AlarmTestResponse, ApiResponse, DraftResponse, HealthResponse,
    StatusResponse, ValidationErrorResponse,
};

fn internal_error(context: &str, e: impl std::fmt::Display) -> StatusCode {
    error!("{}: {}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn validation_error(e: &SettingsError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorResponse::new(e.to_string(), e.field())),
    )
        .into_response()
}

/// Handle GET /state - Return the current timer view
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerView>, StatusCode> {
    state
        .get_view()
        .map(Json)
        .map_err(|e| internal_error("Failed to get timer view", e))
}

/// Handle POST /toggle - Start or pause the countdown
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.toggle_run() {
        Ok(view) => {
            let message = if view.is_running { "Timer started" } else { "Timer paused" };
            info!("Toggle endpoint called - {}", message.to_lowercase());
            Ok(Json(ApiResponse::for_view(message.to_string(), view)))
        }
        Err(e) => Err(internal_error("Failed to toggle timer", e)),
    }
}

/// Handle POST /reset - Stop and return to a full focus phase
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset() {
        Ok(view) => {
            info!("Reset endpoint called - timer reset");
            Ok(Json(ApiResponse::paused("Timer reset".to_string(), view)))
        }
        Err(e) => Err(internal_error("Failed to reset timer", e)),
    }
}

/// Handle POST /skip - End the current phase early
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.skip() {
        Ok(view) => {
            info!("Skip endpoint called - now in {}", view.phase.label());
            Ok(Json(ApiResponse::running(
                format!("{} started", view.phase.label()),
                view,
            )))
        }
        Err(e) => Err(internal_error("Failed to skip phase", e)),
    }
}

/// Handle POST /settings/open - Open the settings editor and return its draft
pub async fn open_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DraftResponse>, StatusCode> {
    match state.open_settings() {
        Ok(draft) => Ok(Json(DraftResponse {
            editing: true,
            draft: Some(draft),
        })),
        Err(e) => Err(internal_error("Failed to open settings", e)),
    }
}

/// Handle GET /settings/draft - Return the draft being edited, if any
pub async fn draft_handler(State(state): State<Arc<AppState>>) -> Result<Json<DraftResponse>, StatusCode> {
    match state.get_draft() {
        Ok(draft) => Ok(Json(DraftResponse {
            editing: draft.is_some(),
            draft,
        })),
        Err(e) => Err(internal_error("Failed to get settings draft", e)),
    }
}

/// Handle POST /settings - Validate and commit a settings draft
pub async fn save_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<DraftSettings>,
) -> Response {
    match state.save_settings(draft) {
        Ok(view) => {
            info!("Settings endpoint called - settings saved");
            Json(ApiResponse::for_view("Settings saved".to_string(), view)).into_response()
        }
        Err(CommandError::InvalidSettings(e)) => validation_error(&e),
        Err(CommandError::Internal(e)) => internal_error("Failed to save settings", e).into_response(),
    }
}

/// Handle POST /settings/cancel - Close the settings editor without saving
pub async fn cancel_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.cancel_settings() {
        Ok(view) => Ok(Json(ApiResponse::for_view("Settings discarded".to_string(), view))),
        Err(e) => Err(internal_error("Failed to cancel settings", e)),
    }
}

/// Handle POST /alarm/test - Play the alarm once, optionally at a given volume
pub async fn alarm_test_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<AlarmTestRequest>>,
) -> Response {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    match state.test_alarm(request.volume.as_deref()) {
        Ok(volume_percent) => Json(AlarmTestResponse {
            status: "played".to_string(),
            volume_percent,
        })
        .into_response(),
        Err(CommandError::InvalidSettings(e)) => validation_error(&e),
        Err(CommandError::Internal(e)) => internal_error("Failed to test alarm", e).into_response(),
    }
}

/// Handle GET /status - Return the timer with server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = state
        .get_view()
        .map_err(|e| internal_error("Failed to get timer view", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

fn json_event<T: Serialize>(name: &str, payload: &T) -> Result<Event, Infallible> {
    Ok(Event::default().event(name).json_data(payload).unwrap_or_else(|e| {
        warn!("Failed to encode {} event: {}", name, e);
        Event::default().event("error").data(e.to_string())
    }))
}

/// Handle GET /events - Stream view updates and notifications as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Event stream subscriber connected");

    let views = stream::unfold((state.subscribe_view(), true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let view = rx.borrow_and_update().clone();
        Some((json_event("state", &view), (rx, false)))
    });

    let notifications = stream::unfold(state.subscribe_notifications(), |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notification) => return Some((json_event("notification", &notification), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, {} notifications dropped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream::select(views, notifications)).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
