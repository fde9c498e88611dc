use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::future::{self, BoxFuture, FutureExt};
use serde_json::{json, Value};
use tower::ServiceExt;

use pomodoro_timer::{
    create_router,
    services::AlarmNotifier,
    state::{AppState, Settings},
};

#[derive(Debug, Default)]
struct Recorder {
    volumes: Mutex<Vec<u8>>,
}

impl AlarmNotifier for Recorder {
    fn play(&self, volume_percent: u8) -> BoxFuture<'static, Result<(), String>> {
        self.volumes.lock().unwrap().push(volume_percent);
        future::ready(Ok(())).boxed()
    }
}

fn app(focus: u32, brk: u32) -> (Router, Arc<AppState>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let settings = Settings::new(focus, brk, 50).unwrap();
    let state = Arc::new(AppState::new(8025, "127.0.0.1".to_string(), settings, recorder.clone()));
    (create_router(Arc::clone(&state)), state, recorder)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn state_reports_initial_focus_phase() {
    let (router, _, _) = app(25, 5);

    let (status, body) = send(&router, Method::GET, "/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "focus");
    assert_eq!(body["seconds_remaining"], 1500);
    assert_eq!(body["display"], "25:00");
    assert_eq!(body["progress"], 0.0);
    assert_eq!(body["is_running"], false);
    assert_eq!(body["settings"]["break_minutes"], 5);
}

#[tokio::test]
async fn toggle_starts_and_pauses() {
    let (router, _, _) = app(25, 5);

    let (status, body) = send(&router, Method::POST, "/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["is_running"], true);

    let (_, body) = send(&router, Method::POST, "/toggle", None).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["timer"]["is_running"], false);
}

#[tokio::test]
async fn skip_credits_elapsed_focus_and_autostarts() {
    let (router, state, recorder) = app(30, 5);
    state.toggle_run().unwrap();
    let epoch = state.subscribe_run_signal().borrow().epoch;
    for _ in 0..(5 * 60) {
        state.tick(epoch).unwrap();
    }

    let (status, body) = send(&router, Method::POST, "/skip", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "break");
    assert_eq!(body["timer"]["seconds_remaining"], 300);
    assert_eq!(body["timer"]["total_focused_seconds"], 300);
    assert_eq!(body["timer"]["is_running"], true);
    assert_eq!(*recorder.volumes.lock().unwrap(), vec![50]);
}

#[tokio::test]
async fn reset_twice_matches_reset_once() {
    let (router, _, _) = app(25, 5);
    send(&router, Method::POST, "/skip", None).await;

    let (_, once) = send(&router, Method::POST, "/reset", None).await;
    let (_, twice) = send(&router, Method::POST, "/reset", None).await;
    assert_eq!(once["timer"], twice["timer"]);
    assert_eq!(once["timer"]["phase"], "focus");
    assert_eq!(once["timer"]["seconds_remaining"], 1500);
    assert_eq!(once["status"], "paused");
}

#[tokio::test]
async fn settings_editor_flow() {
    let (router, _, _) = app(30, 10);

    let (status, body) = send(&router, Method::POST, "/settings/open", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["editing"], true);
    assert_eq!(body["draft"]["focus_minutes"], "30");

    let (status, body) = send(
        &router,
        Method::POST,
        "/settings",
        Some(json!({ "focus_minutes": "0", "break_minutes": "15" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["field"], "focus_minutes");

    let (_, body) = send(&router, Method::GET, "/settings/draft", None).await;
    assert_eq!(body["editing"], true);
    assert_eq!(body["draft"]["focus_minutes"], "0");

    let (_, state) = send(&router, Method::GET, "/state", None).await;
    assert_eq!(state["settings"]["focus_minutes"], 30);

    let (status, body) = send(
        &router,
        Method::POST,
        "/settings",
        Some(json!({ "focus_minutes": "25", "break_minutes": "5", "alarm_volume_percent": "70" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["settings"]["focus_minutes"], 25);
    assert_eq!(body["timer"]["settings"]["break_minutes"], 5);
    assert_eq!(body["timer"]["settings"]["alarm_volume_percent"], 70);
    assert_eq!(body["timer"]["seconds_remaining"], 1500);
    assert_eq!(body["timer"]["editing_settings"], false);
}

#[tokio::test]
async fn cancel_closes_editor() {
    let (router, _, _) = app(25, 5);
    send(&router, Method::POST, "/settings/open", None).await;

    let (status, _) = send(&router, Method::POST, "/settings/cancel", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, Method::GET, "/settings/draft", None).await;
    assert_eq!(body["editing"], false);
    assert_eq!(body["draft"], Value::Null);
}

#[tokio::test]
async fn alarm_test_takes_volume_as_parameter() {
    let (router, state, recorder) = app(25, 5);

    let (status, body) = send(&router, Method::POST, "/alarm/test", Some(json!({ "volume": "20" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["volume_percent"], 20);

    let (status, body) = send(&router, Method::POST, "/alarm/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["volume_percent"], 50);

    let (status, body) = send(&router, Method::POST, "/alarm/test", Some(json!({ "volume": "150" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "alarm_volume");

    assert_eq!(*recorder.volumes.lock().unwrap(), vec![20, 50]);
    assert_eq!(state.get_settings().unwrap().alarm_volume_percent, 50);
}

#[tokio::test]
async fn status_and_health() {
    let (router, _, _) = app(25, 5);
    send(&router, Method::POST, "/toggle", None).await;

    let (status, body) = send(&router, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["port"], 8025);
    assert_eq!(body["last_action"], "toggle");
    assert_eq!(body["timer"]["is_running"], true);

    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
