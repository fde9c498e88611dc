//! Configuration and CLI argument handling

use std::{path::PathBuf, sync::Arc};
use clap::Parser;

use crate::{
    services::{AlarmNotifier, CommandAlarm, SilentAlarm, TerminalBell},
    state::{
        settings::{DEFAULT_ALARM_VOLUME_PERCENT, DEFAULT_BREAK_MINUTES, DEFAULT_FOCUS_MINUTES},
        Settings, SettingsError,
    },
};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "pomodoro-timer")]
#[command(about = "A Pomodoro focus/break countdown timer served over local HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "8025")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Focus phase length in minutes
    #[arg(short, long, default_value_t = DEFAULT_FOCUS_MINUTES)]
    pub focus: u32,

    /// Break phase length in minutes
    #[arg(short = 'b', long = "break", default_value_t = DEFAULT_BREAK_MINUTES)]
    pub break_minutes: u32,

    /// Alarm volume in percent (0-100)
    #[arg(long, default_value_t = DEFAULT_ALARM_VOLUME_PERCENT)]
    pub volume: u8,

    /// Sound file played at phase transitions; the terminal bell is used without one
    #[arg(long)]
    pub alarm_sound: Option<PathBuf>,

    /// Program used to play the alarm sound file
    #[arg(long, default_value = "paplay")]
    pub alarm_player: String,

    /// Never play an alarm
    #[arg(long)]
    pub no_sound: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Initial timer settings, checked with the same rules as a saved draft
    pub fn settings(&self) -> Result<Settings, SettingsError> {
        Settings::new(self.focus, self.break_minutes, self.volume)
    }

    /// Build the alarm capability selected by the flags
    pub fn alarm(&self) -> Arc<dyn AlarmNotifier> {
        if self.no_sound {
            return Arc::new(SilentAlarm);
        }
        match &self.alarm_sound {
            Some(path) => Arc::new(CommandAlarm::new(self.alarm_player.clone(), path.clone())),
            None => Arc::new(TerminalBell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["pomodoro-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:8025");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.settings().unwrap(), Settings::default());
        assert!(format!("{:?}", config.alarm()).contains("TerminalBell"));
    }

    #[test]
    fn custom_durations_and_sound() {
        let config = Config::try_parse_from([
            "pomodoro-timer",
            "--focus",
            "50",
            "--break",
            "10",
            "--volume",
            "80",
            "--alarm-sound",
            "/usr/share/sounds/bell.oga",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.settings().unwrap(), Settings::new(50, 10, 80).unwrap());
        assert_eq!(config.log_level(), "debug");
        assert!(format!("{:?}", config.alarm()).contains("paplay"));
    }

    #[test]
    fn no_sound_wins() {
        let config = Config::try_parse_from([
            "pomodoro-timer",
            "--no-sound",
            "--alarm-sound",
            "/tmp/bell.oga",
        ])
        .unwrap();
        assert!(format!("{:?}", config.alarm()).contains("SilentAlarm"));
    }

    #[test]
    fn zero_focus_is_rejected() {
        let config = Config::try_parse_from(["pomodoro-timer", "--focus", "0"]).unwrap();
        assert!(config.settings().is_err());
    }
}
