//! Focus/break countdown state machine
//!
//! [`TimerState`] is a plain value; every change goes through
//! [`TimerState::apply`], which returns the next state together with the
//! side effects (alarm, notifications) the caller has to carry out.

use serde::{Deserialize, Serialize};

use super::{notification::Notification, settings::Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::Break => "Break",
        }
    }

    /// Configured length of this phase in seconds
    pub fn duration_seconds(self, settings: &Settings) -> u32 {
        match self {
            Phase::Focus => settings.focus_seconds(),
            Phase::Break => settings.break_seconds(),
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleRun,
    Tick,
    Reset,
    Skip,
    /// Committed settings changed; `apply` receives the new ones
    SettingsChanged,
}

/// Work requested by a transition, performed outside the state lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SoundAlarm,
    Notify(Notification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TimerState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: TimerState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub is_running: bool,
    pub total_focused_seconds: u64,
}

impl TimerState {
    /// Paused at the start of a focus phase
    pub fn new(settings: &Settings) -> Self {
        Self {
            phase: Phase::Focus,
            seconds_remaining: settings.focus_seconds(),
            is_running: false,
            total_focused_seconds: 0,
        }
    }

    pub fn apply(&self, settings: &Settings, command: Command) -> Transition {
        match command {
            Command::ToggleRun => Transition::quiet(self.toggle_run(settings)),
            Command::Tick => self.tick(settings),
            Command::Reset => Transition {
                state: self.reset(settings),
                effects: vec![Effect::Notify(Notification::timer_reset())],
            },
            Command::Skip => self.skip(settings),
            Command::SettingsChanged => Transition::quiet(self.settings_changed(settings)),
        }
    }

    pub fn phase_total_seconds(&self, settings: &Settings) -> u32 {
        self.phase.duration_seconds(settings)
    }

    /// Fraction of the current phase already elapsed, clamped to `[0, 1]`
    ///
    /// The remaining time can exceed the phase length after the duration was
    /// shortened while paused mid-phase.
    pub fn progress(&self, settings: &Settings) -> f64 {
        let total = self.phase_total_seconds(settings);
        if total == 0 {
            return 0.0;
        }
        let elapsed = f64::from(total) - f64::from(self.seconds_remaining);
        (elapsed / f64::from(total)).clamp(0.0, 1.0)
    }

    fn toggle_run(&self, settings: &Settings) -> Self {
        let mut next = *self;
        next.is_running = !self.is_running;
        if next.is_running && next.seconds_remaining == 0 {
            next.seconds_remaining = self.phase_total_seconds(settings);
        }
        next
    }

    fn tick(&self, settings: &Settings) -> Transition {
        if !self.is_running {
            return Transition::quiet(*self);
        }
        if self.seconds_remaining > 1 {
            let mut next = *self;
            next.seconds_remaining -= 1;
            return Transition::quiet(next);
        }

        // Natural expiry credits the whole configured focus length
        let credit = match self.phase {
            Phase::Focus => u64::from(settings.focus_seconds()),
            Phase::Break => 0,
        };
        let next = self.enter(self.phase.next(), settings, credit, true);
        Transition {
            state: next,
            effects: vec![
                Effect::SoundAlarm,
                Effect::Notify(Notification::phase_ended(self.phase, next.phase)),
            ],
        }
    }

    fn reset(&self, settings: &Settings) -> Self {
        self.enter(Phase::Focus, settings, 0, false)
    }

    fn skip(&self, settings: &Settings) -> Transition {
        // Skipping only credits what was actually spent focusing
        let credit = match self.phase {
            Phase::Focus => u64::from(
                self.phase_total_seconds(settings)
                    .saturating_sub(self.seconds_remaining),
            ),
            Phase::Break => 0,
        };
        let next = self.enter(self.phase.next(), settings, credit, true);
        Transition {
            state: next,
            effects: vec![
                Effect::SoundAlarm,
                Effect::Notify(Notification::skipped(self.phase, next.phase)),
            ],
        }
    }

    fn settings_changed(&self, settings: &Settings) -> Self {
        if self.is_running {
            return *self;
        }
        let mut next = *self;
        next.seconds_remaining = self.phase_total_seconds(settings);
        next
    }

    fn enter(&self, phase: Phase, settings: &Settings, credit: u64, running: bool) -> Self {
        Self {
            phase,
            seconds_remaining: phase.duration_seconds(settings),
            is_running: running,
            total_focused_seconds: self.total_focused_seconds.saturating_add(credit),
        }
    }
}
