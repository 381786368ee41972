//! Elapsed-time tracking for the during-session step
//!
//! [`ElapsedTracker`] is a plain accumulator advanced by explicit ticks.
//! [`Ticker`] is the periodic tick source; it owns a background task that is
//! aborted when the ticker is dropped, so a view holding one can never leak it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
}

/// Start/pause accumulator of whole seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTracker {
    elapsed_secs: u64,
    state: TimerState,
}

impl ElapsedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Flip between running and stopped
    pub fn toggle(&mut self) -> TimerState {
        self.state = match self.state {
            TimerState::Stopped => TimerState::Running,
            TimerState::Running => TimerState::Stopped,
        };
        self.state
    }

    pub fn start(&mut self) {
        self.state = TimerState::Running;
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    /// Count one interval. Ignored while stopped.
    pub fn tick(&mut self) -> bool {
        if self.is_running() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// `MM:SS`; minutes keep growing past 59
    pub fn formatted(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }
}

pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Periodic tick source backed by a tokio task.
///
/// Must be created inside a tokio runtime. The first tick arrives one full
/// period after spawning.
pub struct Ticker {
    handle: JoinHandle<()>,
    rx: mpsc::UnboundedReceiver<()>,
    period: Duration,
}

impl Ticker {
    pub fn spawn(period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        debug!(?period, "ticker started");
        Self { handle, rx, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Take every tick delivered since the last call, without waiting
    pub fn drain(&mut self) -> u64 {
        let mut count = 0;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    /// Wait for the next tick
    pub async fn next_tick(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("ticker stopped");
    }
}
