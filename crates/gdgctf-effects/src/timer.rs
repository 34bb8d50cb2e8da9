//! The challenge page's elapsed-time clock.
//!
//! Elapsed seconds live in a `watch` channel owned by the timer, not by the
//! interval task. Restarting the interval (every visit to the challenge
//! page) therefore keeps counting from where it was.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::IntervalSlot;

/// Timing for the challenge clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeTimerConfig {
    /// Interval between ticks. Each tick adds one second.
    pub period_ms: u64,
    /// Elapsed seconds at which the progress bar is full.
    pub full_bar_secs: u64,
}

impl Default for ChallengeTimerConfig {
    fn default() -> Self {
        Self {
            period_ms: 1_000,
            full_bar_secs: 3_600,
        }
    }
}

/// Snapshot of the challenge clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChallengeClock {
    pub elapsed_secs: u64,
}

impl ChallengeClock {
    /// Progress bar width, `0.0..=100.0`.
    pub fn progress_percent(&self, full_bar_secs: u64) -> f64 {
        if full_bar_secs == 0 {
            return 100.0;
        }
        (self.elapsed_secs as f64 / full_bar_secs as f64 * 100.0).min(100.0)
    }
}

/// `HH:MM:SS`, hours not wrapped.
impl fmt::Display for ChallengeClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.elapsed_secs;
        write!(f, "{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
    }
}

/// Restartable challenge clock.
pub struct ChallengeTimer {
    config: ChallengeTimerConfig,
    slot: IntervalSlot,
    clock: Arc<watch::Sender<ChallengeClock>>,
}

impl ChallengeTimer {
    pub fn new(config: ChallengeTimerConfig) -> Self {
        let (clock, _) = watch::channel(ChallengeClock::default());
        Self {
            config,
            slot: IntervalSlot::new("challenge-timer"),
            clock: Arc::new(clock),
        }
    }

    /// Starts ticking, cancelling any running interval first.
    pub fn restart(&mut self) {
        let clock = Arc::clone(&self.clock);
        let period = Duration::from_millis(self.config.period_ms.max(1));
        self.slot.restart(period, move || {
            clock.send_modify(|c| c.elapsed_secs += 1);
        });
    }

    pub fn stop(&mut self) -> bool {
        self.slot.cancel()
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_running()
    }

    /// How many times the clock has been (re)started.
    pub fn starts(&self) -> u64 {
        self.slot.starts()
    }

    pub fn clock(&self) -> ChallengeClock {
        *self.clock.borrow()
    }

    /// Receives every clock update; used by hosts to redraw the display.
    pub fn subscribe(&self) -> watch::Receiver<ChallengeClock> {
        self.clock.subscribe()
    }

    pub fn config(&self) -> &ChallengeTimerConfig {
        &self.config
    }
}
