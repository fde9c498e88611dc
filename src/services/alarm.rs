//! Alarm playback
//!
//! The timer only knows the [`AlarmNotifier`] trait. Playback is always
//! fire-and-forget: [`sound_alarm`] spawns the returned future and logs a
//! failure instead of reporting it back to the state machine.

use std::{fmt, path::PathBuf, sync::Arc};

use futures::future::{self, BoxFuture, FutureExt};
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info, warn};

/// Full scale of the `paplay --volume` option
const PULSE_VOLUME_NORM: u32 = 65536;

/// Something that can make an alarm sound
pub trait AlarmNotifier: Send + Sync + fmt::Debug {
    /// Start playing the alarm at `volume_percent` (0-100)
    fn play(&self, volume_percent: u8) -> BoxFuture<'static, Result<(), String>>;
}

/// Plays a sound file through an external player program
#[derive(Debug, Clone)]
pub struct CommandAlarm {
    pub player: String,
    pub sound_path: PathBuf,
}

impl CommandAlarm {
    pub fn new(player: impl Into<String>, sound_path: impl Into<PathBuf>) -> Self {
        Self {
            player: player.into(),
            sound_path: sound_path.into(),
        }
    }

    /// Arguments passed to the player; `paplay` style volume scaling
    pub fn args(&self, volume_percent: u8) -> Vec<String> {
        let volume = u32::from(volume_percent.min(100)) * PULSE_VOLUME_NORM / 100;
        vec![
            format!("--volume={}", volume),
            self.sound_path.to_string_lossy().into_owned(),
        ]
    }
}

impl AlarmNotifier for CommandAlarm {
    fn play(&self, volume_percent: u8) -> BoxFuture<'static, Result<(), String>> {
        let player = self.player.clone();
        let args = self.args(volume_percent);

        async move {
            debug!("Running alarm player: {} {:?}", player, args);

            let output = Command::new(&player)
                .args(&args)
                .output()
                .await
                .map_err(|e| format!("Failed to execute {}: {}", player, e))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(format!("{} failed: {}", player, stderr.trim()));
            }

            Ok(())
        }
        .boxed()
    }
}

/// Rings the terminal bell on stderr; volume can only mute it
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AlarmNotifier for TerminalBell {
    fn play(&self, volume_percent: u8) -> BoxFuture<'static, Result<(), String>> {
        async move {
            if volume_percent == 0 {
                return Ok(());
            }

            let mut stderr = tokio::io::stderr();
            stderr
                .write_all(b"\x07")
                .await
                .map_err(|e| format!("Failed to ring terminal bell: {}", e))?;
            stderr
                .flush()
                .await
                .map_err(|e| format!("Failed to flush terminal bell: {}", e))
        }
        .boxed()
    }
}

/// Used with `--no-sound`
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlarm;

impl AlarmNotifier for SilentAlarm {
    fn play(&self, volume_percent: u8) -> BoxFuture<'static, Result<(), String>> {
        debug!("Alarm muted (volume {}%)", volume_percent);
        future::ready(Ok(())).boxed()
    }
}

/// Start the alarm without waiting for it
///
/// The notifier is invoked immediately; the playback future runs on the
/// current tokio runtime. Outside a runtime the playback is dropped with a
/// warning.
pub fn sound_alarm(notifier: &Arc<dyn AlarmNotifier>, volume_percent: u8, reason: &'static str) {
    info!("Sounding alarm ({}) at {}% volume", reason, volume_percent);
    let playback = notifier.play(volume_percent);

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(e) = playback.await {
                    warn!("Alarm playback failed ({}): {}", reason, e);
                }
            });
        }
        Err(_) => warn!("No async runtime available, alarm ({}) not played", reason),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every requested volume; optionally fails playback
    #[derive(Debug, Default)]
    pub struct RecordingAlarm {
        pub volumes: Mutex<Vec<u8>>,
        pub fail: bool,
    }

    impl RecordingAlarm {
        pub fn failing() -> Self {
            Self {
                volumes: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn played(&self) -> Vec<u8> {
            self.volumes.lock().unwrap().clone()
        }
    }

    impl AlarmNotifier for RecordingAlarm {
        fn play(&self, volume_percent: u8) -> BoxFuture<'static, Result<(), String>> {
            self.volumes.lock().unwrap().push(volume_percent);
            let result = if self.fail {
                Err("audio device not ready".to_string())
            } else {
                Ok(())
            };
            future::ready(result).boxed()
        }
    }
}
