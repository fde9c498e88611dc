//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{
    notification::Notification,
    settings::{parse_volume, DraftSettings, Settings, SettingsError},
    timer_state::{Command, Effect, Phase, TimerState},
};
use crate::{
    services::{sound_alarm, AlarmNotifier},
    utils::{format_duration, format_time},
};

/// Everything a command reads or writes, guarded by one lock so that
/// commands and ticks never interleave
#[derive(Debug)]
struct Session {
    timer: TimerState,
    settings: Settings,
    draft: Option<DraftSettings>,
    epoch: u64,
}

fn current_signal(session: &Session) -> RunSignal {
    RunSignal {
        running: session.timer.is_running,
        epoch: session.epoch,
    }
}

/// Failure of a user command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),

    #[error("{0}")]
    Internal(String),
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        CommandError::Internal(message)
    }
}

/// What the tick task needs to know: whether to count down, and for which running span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSignal {
    pub running: bool,
    pub epoch: u64,
}

/// Read-only view model handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub display: String,
    pub phase_total_seconds: u32,
    pub progress: f64,
    pub is_running: bool,
    pub total_focused_seconds: u64,
    pub total_focused_display: String,
    pub settings: Settings,
    pub editing_settings: bool,
}

impl TimerView {
    fn from_session(session: &Session) -> Self {
        let timer = &session.timer;
        Self {
            phase: timer.phase,
            seconds_remaining: timer.seconds_remaining,
            display: format_time(timer.seconds_remaining),
            phase_total_seconds: timer.phase_total_seconds(&session.settings),
            progress: timer.progress(&session.settings),
            is_running: timer.is_running,
            total_focused_seconds: timer.total_focused_seconds,
            total_focused_display: format_duration(timer.total_focused_seconds),
            settings: session.settings,
            editing_settings: session.draft.is_some(),
        }
    }
}

/// Main application state that owns the timer, its settings and the alarm
#[derive(Debug)]
pub struct AppState {
    session: Mutex<Session>,
    /// Alarm capability used at phase boundaries
    alarm: Arc<dyn AlarmNotifier>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for notifications (phase ended, settings saved, ...)
    pub notification_tx: broadcast::Sender<Notification>,
    /// Channel for view updates
    pub view_tx: watch::Sender<TimerView>,
    /// Channel driving the tick task
    pub run_tx: watch::Sender<RunSignal>,
    /// Keep the receivers alive to prevent channel closure
    _view_rx: watch::Receiver<TimerView>,
    _run_rx: watch::Receiver<RunSignal>,
}

impl AppState {
    /// Create a new AppState, paused at the start of a focus phase
    pub fn new(port: u16, host: String, settings: Settings, alarm: Arc<dyn AlarmNotifier>) -> Self {
        let session = Session {
            timer: TimerState::new(&settings),
            settings,
            draft: None,
            epoch: 0,
        };
        let (notification_tx, _) = broadcast::channel(100);
        let (view_tx, view_rx) = watch::channel(TimerView::from_session(&session));
        let (run_tx, run_rx) = watch::channel(RunSignal {
            running: false,
            epoch: 0,
        });

        Self {
            session: Mutex::new(session),
            alarm,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            notification_tx,
            view_tx,
            run_tx,
            _view_rx: view_rx,
            _run_rx: run_rx,
        }
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, String> {
        self.session
            .lock()
            .map_err(|e| format!("Failed to lock timer session: {}", e))
    }

    /// Apply a command to the timer, publish the result and carry out its effects
    fn dispatch(&self, action: &'static str, command: Command) -> Result<TimerView, String> {
        let session = self.lock_session()?;
        Ok(self.apply_locked(session, action, command))
    }

    /// Apply a command on an already locked session and publish the result
    /// under the same lock; effects run after the lock is released
    fn apply_locked(
        &self,
        mut session: MutexGuard<'_, Session>,
        action: &'static str,
        command: Command,
    ) -> TimerView {
        let transition = session.timer.apply(&session.settings, command);
        if transition.state.is_running != session.timer.is_running || command == Command::Reset {
            session.epoch += 1;
        }
        session.timer = transition.state;

        let view = self.publish_locked(&session);
        let volume = session.settings.alarm_volume_percent;
        drop(session);

        if command != Command::Tick {
            self.record_action(action);
        }

        for effect in transition.effects {
            match effect {
                Effect::SoundAlarm => sound_alarm(&self.alarm, volume, action),
                Effect::Notify(notification) => self.notify(notification),
            }
        }

        view
    }

    /// Send the view and run signal for `session`
    ///
    /// Must be called while the session lock is held, so that publications
    /// happen in the same order as the changes they describe.
    fn publish_locked(&self, session: &Session) -> TimerView {
        let view = TimerView::from_session(session);
        let signal = current_signal(session);
        if let Err(e) = self.view_tx.send(view.clone()) {
            warn!("Failed to send view update: {}", e);
        }
        self.run_tx.send_if_modified(|current| {
            if *current == signal {
                return false;
            }
            debug!("Run signal changed: running={}, epoch={}", signal.running, signal.epoch);
            *current = signal;
            true
        });
        view
    }

    fn notify(&self, notification: Notification) {
        info!(
            "Notification [{:?}] {}: {}",
            notification.kind, notification.title, notification.detail
        );
        // No subscriber is normal when nobody is listening to the event stream
        if self.notification_tx.send(notification).is_err() {
            debug!("No notification subscribers");
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Start or pause the countdown
    pub fn toggle_run(&self) -> Result<TimerView, String> {
        let view = self.dispatch("toggle", Command::ToggleRun)?;
        info!("Timer {}", if view.is_running { "started" } else { "paused" });
        Ok(view)
    }

    /// Stop and go back to the start of a focus phase
    pub fn reset(&self) -> Result<TimerView, String> {
        info!("Resetting timer");
        self.dispatch("reset", Command::Reset)
    }

    /// End the current phase early and start the next one
    pub fn skip(&self) -> Result<TimerView, String> {
        info!("Skipping current phase");
        self.dispatch("skip", Command::Skip)
    }

    /// Advance the countdown by one second
    ///
    /// Returns `None` when the tick was scheduled for a running span that has
    /// since been paused or reset, in which case nothing changes.
    pub fn tick(&self, epoch: u64) -> Result<Option<TimerView>, String> {
        let session = self.lock_session()?;
        if session.epoch != epoch || !session.timer.is_running {
            debug!("Dropping stale tick (epoch {}, current {})", epoch, session.epoch);
            return Ok(None);
        }
        Ok(Some(self.apply_locked(session, "phase ended", Command::Tick)))
    }

    /// Open the settings editor with a draft of the committed settings
    pub fn open_settings(&self) -> Result<DraftSettings, String> {
        let mut session = self.lock_session()?;
        let draft = DraftSettings::from(&session.settings);
        session.draft = Some(draft.clone());
        self.publish_locked(&session);
        drop(session);

        self.record_action("settings-open");
        Ok(draft)
    }

    /// Draft currently being edited, if the editor is open
    pub fn get_draft(&self) -> Result<Option<DraftSettings>, String> {
        Ok(self.lock_session()?.draft.clone())
    }

    /// Close the settings editor without saving
    pub fn cancel_settings(&self) -> Result<TimerView, String> {
        let mut session = self.lock_session()?;
        session.draft = None;
        let view = self.publish_locked(&session);
        drop(session);

        self.record_action("settings-cancel");
        Ok(view)
    }

    /// Validate and commit a settings draft
    ///
    /// On rejection the committed settings stay authoritative, an open
    /// editor keeps the submitted draft, and a `settings_invalid`
    /// notification is emitted.
    pub fn save_settings(&self, draft: DraftSettings) -> Result<TimerView, CommandError> {
        let validated = match draft.validate() {
            Ok(validated) => validated,
            Err(e) => {
                warn!("Rejected settings: {}", e);
                let mut session = self.lock_session()?;
                // Only an open editor keeps the rejected input
                if session.draft.is_some() {
                    session.draft = Some(draft);
                    self.publish_locked(&session);
                }
                drop(session);
                self.notify(Notification::settings_invalid(&e));
                return Err(e.into());
            }
        };

        let mut session = self.lock_session()?;
        session.settings = session.settings.with_validated(validated);
        session.draft = None;
        let settings = session.settings;
        info!(
            "Settings saved: focus={}min, break={}min, volume={}%",
            settings.focus_minutes, settings.break_minutes, settings.alarm_volume_percent
        );

        let view = self.apply_locked(session, "settings-save", Command::SettingsChanged);
        self.notify(Notification::settings_saved(&settings));
        Ok(view)
    }

    /// Play the alarm once without touching any state
    ///
    /// `volume` is a raw percentage string; the committed volume is used when absent.
    pub fn test_alarm(&self, volume: Option<&str>) -> Result<u8, CommandError> {
        let volume_percent = match volume {
            Some(raw) => parse_volume(raw)?,
            None => self.get_settings()?.alarm_volume_percent,
        };

        sound_alarm(&self.alarm, volume_percent, "test");
        Ok(volume_percent)
    }

    /// Stop the countdown for good; used on shutdown
    pub fn shutdown(&self) -> Result<(), String> {
        let mut session = self.lock_session()?;
        session.timer.is_running = false;
        session.epoch += 1;
        self.publish_locked(&session);
        drop(session);

        info!("Timer stopped for shutdown");
        Ok(())
    }

    /// Get the current view model
    pub fn get_view(&self) -> Result<TimerView, String> {
        self.lock_session().map(|session| TimerView::from_session(&session))
    }

    /// Get the raw timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.lock_session().map(|session| session.timer)
    }

    /// Get committed settings
    pub fn get_settings(&self) -> Result<Settings, String> {
        self.lock_session().map(|session| session.settings)
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notification_tx.subscribe()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<TimerView> {
        self.view_tx.subscribe()
    }

    pub fn subscribe_run_signal(&self) -> watch::Receiver<RunSignal> {
        self.run_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_duration(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
