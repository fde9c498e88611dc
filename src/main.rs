//! Pomodoro Timer - A focus/break countdown timer served over local HTTP
//!
//! This is the main entry point for the pomodoro-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::countdown_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-timer v{}", env!("CARGO_PKG_VERSION"));
    let settings = config.settings()?;
    info!(
        "Configuration: host={}, port={}, focus={}min, break={}min, volume={}%",
        config.host, config.port, settings.focus_minutes, settings.break_minutes,
        settings.alarm_volume_percent
    );

    // Create application state with the selected alarm
    let alarm = config.alarm();
    info!("Alarm: {:?}", alarm);
    let state = Arc::new(AppState::new(config.port, config.host.clone(), settings, alarm));

    // Start the countdown ticker background task
    let ticker_state = Arc::clone(&state);
    let ticker = tokio::spawn(async move {
        countdown_ticker_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /state           - Current timer view");
    info!("  POST /toggle          - Start or pause");
    info!("  POST /reset           - Reset to focus");
    info!("  POST /skip            - Skip to the next phase");
    info!("  POST /settings/open   - Open the settings editor");
    info!("  POST /settings        - Save settings draft");
    info!("  POST /settings/cancel - Discard settings draft");
    info!("  POST /alarm/test      - Play the alarm once");
    info!("  GET  /events          - Server-sent events");
    info!("  GET  /status          - Timer and server status");
    info!("  GET  /health          - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Stop the countdown before tearing the ticker down
    if let Err(e) = state.shutdown() {
        tracing::error!("Failed to stop timer: {}", e);
    }
    ticker.abort();

    info!("Server shutdown complete");
    Ok(())
}
