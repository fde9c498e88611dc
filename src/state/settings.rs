//! Timer settings, the editable draft copy and draft validation

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_ALARM_VOLUME_PERCENT: u8 = 50;

/// Largest duration whose length in seconds still fits the countdown counter
pub const MAX_DURATION_MINUTES: u32 = u32::MAX / 60;
pub const MAX_VOLUME_PERCENT: u8 = 100;

/// Committed timer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub alarm_volume_percent: u8,
}

impl Settings {
    /// Build settings from already-typed values, applying the same rules as a saved draft
    pub fn new(
        focus_minutes: u32,
        break_minutes: u32,
        alarm_volume_percent: u8,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            focus_minutes: check_minutes(SettingsField::FocusMinutes, i64::from(focus_minutes))?,
            break_minutes: check_minutes(SettingsField::BreakMinutes, i64::from(break_minutes))?,
            alarm_volume_percent: check_volume(i64::from(alarm_volume_percent))?,
        })
    }

    pub fn focus_seconds(&self) -> u32 {
        self.focus_minutes * 60
    }

    pub fn break_seconds(&self) -> u32 {
        self.break_minutes * 60
    }

    /// Commit a validated draft; the volume is kept when the draft left it out
    pub fn with_validated(&self, validated: ValidatedSettings) -> Self {
        Self {
            focus_minutes: validated.focus_minutes,
            break_minutes: validated.break_minutes,
            alarm_volume_percent: validated
                .alarm_volume_percent
                .unwrap_or(self.alarm_volume_percent),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            alarm_volume_percent: DEFAULT_ALARM_VOLUME_PERCENT,
        }
    }
}

/// Raw text copy of the settings, edited while the settings editor is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSettings {
    pub focus_minutes: String,
    pub break_minutes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_volume_percent: Option<String>,
}

impl DraftSettings {
    pub fn new(
        focus_minutes: impl Into<String>,
        break_minutes: impl Into<String>,
        alarm_volume_percent: Option<String>,
    ) -> Self {
        Self {
            focus_minutes: focus_minutes.into(),
            break_minutes: break_minutes.into(),
            alarm_volume_percent,
        }
    }

    pub fn validate(&self) -> Result<ValidatedSettings, SettingsError> {
        validate_settings(
            &self.focus_minutes,
            &self.break_minutes,
            self.alarm_volume_percent.as_deref(),
        )
    }
}

impl From<&Settings> for DraftSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            focus_minutes: settings.focus_minutes.to_string(),
            break_minutes: settings.break_minutes.to_string(),
            alarm_volume_percent: Some(settings.alarm_volume_percent.to_string()),
        }
    }
}

/// Output of a successful draft validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSettings {
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub alarm_volume_percent: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsField {
    FocusMinutes,
    BreakMinutes,
    AlarmVolume,
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsField::FocusMinutes => write!(f, "Focus minutes"),
            SettingsField::BreakMinutes => write!(f, "Break minutes"),
            SettingsField::AlarmVolume => write!(f, "Alarm volume"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} must be a whole number, got {value:?}")]
    NotNumeric { field: SettingsField, value: String },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: SettingsField, value: i64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: SettingsField,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl SettingsError {
    pub fn field(&self) -> SettingsField {
        match self {
            SettingsError::NotNumeric { field, .. }
            | SettingsError::NotPositive { field, .. }
            | SettingsError::OutOfRange { field, .. } => *field,
        }
    }
}

/// Validate raw settings input. Pure: committing and reporting are up to the caller.
pub fn validate_settings(
    focus_minutes: &str,
    break_minutes: &str,
    alarm_volume_percent: Option<&str>,
) -> Result<ValidatedSettings, SettingsError> {
    let focus_minutes = parse_minutes(SettingsField::FocusMinutes, focus_minutes)?;
    let break_minutes = parse_minutes(SettingsField::BreakMinutes, break_minutes)?;
    let alarm_volume_percent = alarm_volume_percent.map(parse_volume).transpose()?;

    Ok(ValidatedSettings {
        focus_minutes,
        break_minutes,
        alarm_volume_percent,
    })
}

/// Parse a raw volume string into a percentage in `[0, 100]`
pub fn parse_volume(raw: &str) -> Result<u8, SettingsError> {
    check_volume(parse_integer(SettingsField::AlarmVolume, raw)?)
}

fn parse_minutes(field: SettingsField, raw: &str) -> Result<u32, SettingsError> {
    check_minutes(field, parse_integer(field, raw)?)
}

fn parse_integer(field: SettingsField, raw: &str) -> Result<i64, SettingsError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| SettingsError::NotNumeric {
            field,
            value: raw.to_string(),
        })
}

fn check_minutes(field: SettingsField, value: i64) -> Result<u32, SettingsError> {
    if value <= 0 {
        return Err(SettingsError::NotPositive { field, value });
    }
    u32::try_from(value)
        .ok()
        .filter(|minutes| *minutes <= MAX_DURATION_MINUTES)
        .ok_or(SettingsError::OutOfRange {
            field,
            value,
            min: 1,
            max: i64::from(MAX_DURATION_MINUTES),
        })
}

fn check_volume(value: i64) -> Result<u8, SettingsError> {
    u8::try_from(value)
        .ok()
        .filter(|volume| *volume <= MAX_VOLUME_PERCENT)
        .ok_or(SettingsError::OutOfRange {
            field: SettingsField::AlarmVolume,
            value,
            min: 0,
            max: i64::from(MAX_VOLUME_PERCENT),
        })
}
