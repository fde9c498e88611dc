//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{DraftSettings, SettingsField, TimerView};

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: TimerView) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Timer is counting down after the command
    pub fn running(message: String, timer: TimerView) -> Self {
        Self::new("running", message, timer)
    }

    /// Timer is paused after the command
    pub fn paused(message: String, timer: TimerView) -> Self {
        Self::new("paused", message, timer)
    }

    /// Pick `running` or `paused` from the view
    pub fn for_view(message: String, timer: TimerView) -> Self {
        if timer.is_running {
            Self::running(message, timer)
        } else {
            Self::paused(message, timer)
        }
    }
}

/// Returned when a settings draft or alarm volume is rejected
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: String,
    pub message: String,
    pub field: SettingsField,
    pub timestamp: DateTime<Utc>,
}

impl ValidationErrorResponse {
    pub fn new(message: String, field: SettingsField) -> Self {
        Self {
            status: "error".to_string(),
            message,
            field,
            timestamp: Utc::now(),
        }
    }
}

/// Settings editor state
#[derive(Debug, Clone, Serialize)]
pub struct DraftResponse {
    pub editing: bool,
    pub draft: Option<DraftSettings>,
}

/// Optional body of POST /alarm/test
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlarmTestRequest {
    pub volume: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlarmTestResponse {
    pub status: String,
    pub volume_percent: u8,
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
