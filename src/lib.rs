//! Pomodoro Timer - A focus/break countdown timer as a local state-managed process
//!
//! This library provides the phase/countdown state machine, settings
//! validation, alarm playback and the HTTP surface a UI renders from.

pub mod api;
pub mod config;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
