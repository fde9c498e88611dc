//! Structured notifications for the presentation layer
//!
//! The core never formats user-facing sentences beyond a short title and
//! detail; rendering and localization belong to whoever consumes the stream.

use serde::{Deserialize, Serialize};

use super::{
    settings::{Settings, SettingsError},
    timer_state::Phase,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PhaseEnded,
    SettingsInvalid,
    SettingsSaved,
    TimerReset,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub detail: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// A phase ran out on its own and `next` has started
    pub fn phase_ended(ended: Phase, next: Phase) -> Self {
        Self::new(
            NotificationKind::PhaseEnded,
            format!("{} finished", ended.label()),
            format!("{} started", next.label()),
        )
    }

    pub fn skipped(skipped: Phase, next: Phase) -> Self {
        Self::new(
            NotificationKind::Skipped,
            format!("{} skipped", skipped.label()),
            format!("{} started", next.label()),
        )
    }

    pub fn timer_reset() -> Self {
        Self::new(NotificationKind::TimerReset, "Timer reset", "Back to focus")
    }

    pub fn settings_saved(settings: &Settings) -> Self {
        Self::new(
            NotificationKind::SettingsSaved,
            "Settings saved",
            format!(
                "Focus {} min, break {} min, volume {}%",
                settings.focus_minutes, settings.break_minutes, settings.alarm_volume_percent
            ),
        )
    }

    pub fn settings_invalid(error: &SettingsError) -> Self {
        Self::new(
            NotificationKind::SettingsInvalid,
            "Invalid settings",
            error.to_string(),
        )
    }
}
