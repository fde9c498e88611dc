//! State management module
//!
//! The timer state machine, its settings and the shared application state
//! that applies commands and publishes changes.

pub mod app_state;
pub mod notification;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, CommandError, RunSignal, TimerView};
pub use notification::{Notification, NotificationKind};
pub use settings::{validate_settings, DraftSettings, Settings, SettingsError, SettingsField};
pub use timer_state::{Command, Effect, Phase, TimerState, Transition};
