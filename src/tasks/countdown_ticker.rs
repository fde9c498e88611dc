//! Countdown tick background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that advances the countdown once per second while the timer runs
///
/// The interval only exists while the run signal says the timer is running;
/// any change of the signal (pause, reset, resume) drops it before the next
/// tick can fire. Ticks carry the epoch they were scheduled under, so one
/// racing a pause is discarded by [`AppState::tick`].
pub async fn countdown_ticker_task(state: Arc<AppState>) {
    info!("Starting countdown ticker task");

    let mut run_rx = state.subscribe_run_signal();

    loop {
        let signal = *run_rx.borrow_and_update();

        if !signal.running {
            debug!("Timer paused, ticker idle");
            if run_rx.changed().await.is_err() {
                break;
            }
            continue;
        }

        debug!("Timer running, ticking for epoch {}", signal.epoch);
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Timer tick - advance the countdown
                _ = interval.tick() => {
                    match state.tick(signal.epoch) {
                        Ok(Some(view)) => {
                            debug!("Tick: {} {} left", view.phase.label(), view.display);
                        }
                        Ok(None) => {}
                        Err(e) => error!("Failed to advance countdown: {}", e),
                    }
                }

                // Run signal change - drop this interval and re-evaluate
                changed = run_rx.changed() => {
                    if changed.is_err() {
                        info!("Run signal closed, stopping countdown ticker");
                        return;
                    }
                    debug!("Run signal changed, cancelling interval for epoch {}", signal.epoch);
                    break;
                }
            }
        }
    }

    info!("Countdown ticker task finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::alarm::testing::RecordingAlarm,
        state::{Phase, Settings},
    };

    fn spawn_app(focus: u32, brk: u32) -> (Arc<AppState>, Arc<RecordingAlarm>) {
        let recorder = Arc::new(RecordingAlarm::default());
        let settings = Settings::new(focus, brk, 60).unwrap();
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), settings, recorder.clone()));
        tokio::spawn(countdown_ticker_task(Arc::clone(&state)));
        (state, recorder)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_second_while_running() {
        let (state, _) = spawn_app(25, 5);
        settle().await;

        state.toggle_run().unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(state.get_timer_state().unwrap().seconds_remaining, 25 * 60 - 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_future_ticks() {
        let (state, _) = spawn_app(25, 5);
        settle().await;

        state.toggle_run().unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        state.toggle_run().unwrap();
        let paused_at = state.get_timer_state().unwrap().seconds_remaining;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(state.get_timer_state().unwrap().seconds_remaining, paused_at);
        assert_eq!(paused_at, 25 * 60 - 2);
    }

    #[tokio::test(start_paused = true)]
    async fn chains_into_break_at_expiry() {
        let (state, recorder) = spawn_app(1, 1);
        settle().await;

        state.toggle_run().unwrap();
        tokio::time::sleep(Duration::from_millis(65_500)).await;

        let timer = state.get_timer_state().unwrap();
        assert_eq!(timer.phase, Phase::Break);
        assert!(timer.is_running);
        assert_eq!(timer.seconds_remaining, 60 - 5);
        assert_eq!(timer.total_focused_seconds, 60);
        assert_eq!(recorder.played(), vec![60]);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_then_resume_restarts_cleanly() {
        let (state, _) = spawn_app(25, 5);
        settle().await;

        state.toggle_run().unwrap();
        tokio::time::sleep(Duration::from_millis(4500)).await;
        state.reset().unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(state.get_timer_state().unwrap().seconds_remaining, 25 * 60);

        state.toggle_run().unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(state.get_timer_state().unwrap().seconds_remaining, 25 * 60 - 1);
    }
}
