//! External service module
//!
//! This module contains the alarm capability the timer calls at phase boundaries.

pub mod alarm;

// Re-export main types
pub use alarm::{sound_alarm, AlarmNotifier, CommandAlarm, SilentAlarm, TerminalBell};
