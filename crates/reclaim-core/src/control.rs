//! Shared run-control state.
//!
//! [`RunControl`] is wrapped in an [`Arc`](std::sync::Arc) and shared
//! between the run loop and whatever drives it from outside: the engine's
//! Ctrl-C handler and operator console, or a test. The run moves between [`RunState`]s held in a
//! single atomic; [`Notify`] wakes a paused loop on resume or stop.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::config::SimulationBounds;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// No waste remains on the grid or in any inventory.
    AllClear,
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// A stop was requested.
    Stopped,
}

/// Lifecycle of a run as seen from outside the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Ticks are being executed.
    Running,
    /// The loop waits before the next tick.
    Paused,
    /// The loop ends before the next tick. Terminal.
    Stopping,
}

impl RunState {
    const fn encode(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Paused => 1,
            Self::Stopping => 2,
        }
    }

    const fn decode(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Paused,
            _ => Self::Stopping,
        }
    }
}

/// Pause, stop, speed, and bounds for a run.
#[derive(Debug)]
pub struct RunControl {
    state: AtomicU8,
    wake: Notify,
    tick_interval_ms: AtomicU64,
    started_at: DateTime<Utc>,
    max_ticks: u64,
    max_real_time_seconds: u64,
}

impl RunControl {
    /// Create run control from the configured bounds. The wall clock starts
    /// now.
    pub fn new(bounds: &SimulationBounds) -> Self {
        Self {
            state: AtomicU8::new(RunState::Running.encode()),
            wake: Notify::new(),
            tick_interval_ms: AtomicU64::new(bounds.tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
        }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        RunState::decode(self.state.load(Ordering::Acquire))
    }

    /// Move from `from` to `to`. Fails if the state was not `from`.
    fn transition(&self, from: RunState, to: RunState) -> bool {
        self.state
            .compare_exchange(from.encode(), to.encode(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the run is paused.
    pub fn is_paused(&self) -> bool {
        self.state() == RunState::Paused
    }

    /// Pause before the next tick. Returns `false` if the run was not
    /// running.
    pub fn pause(&self) -> bool {
        self.transition(RunState::Running, RunState::Paused)
    }

    /// Resume and wake the run loop. Returns `false` if the run was not
    /// paused.
    pub fn resume(&self) -> bool {
        let resumed = self.transition(RunState::Paused, RunState::Running);
        if resumed {
            self.wake.notify_one();
        }
        resumed
    }

    /// Wait while the run is paused. Returns at once when it is running or
    /// stopping.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() {
            self.wake.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop before the next tick. Also wakes a paused run.
    pub fn request_stop(&self) {
        self.state.store(RunState::Stopping.encode(), Ordering::Release);
        self.wake.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.state() == RunState::Stopping
    }

    // -----------------------------------------------------------------------
    // Tick speed
    // -----------------------------------------------------------------------

    /// Pause between ticks, in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the pause between ticks. Returns the previous value.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Bounds
    // -----------------------------------------------------------------------

    /// `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// `true` if `max_real_time_seconds > 0` and that many seconds have
    /// passed since the run started.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Wall-clock start of the run.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds since the run started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // Negative if the wall clock stepped backwards.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Configured wall-clock limit in seconds (0 = unlimited).
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(max_ticks: u64) -> SimulationBounds {
        SimulationBounds {
            max_ticks,
            max_real_time_seconds: 0,
            tick_interval_ms: 0,
        }
    }

    #[test]
    fn starts_running() {
        let control = RunControl::new(&bounds(0));
        assert_eq!(control.state(), RunState::Running);
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
    }

    #[test]
    fn pause_and_resume() {
        let control = RunControl::new(&bounds(0));
        assert!(control.pause());
        assert!(!control.pause());
        assert!(control.is_paused());
        assert!(control.resume());
        assert!(!control.resume());
        assert_eq!(control.state(), RunState::Running);
    }

    #[test]
    fn stopping_is_terminal() {
        let control = RunControl::new(&bounds(0));
        control.request_stop();
        assert!(!control.pause());
        assert!(!control.resume());
        assert!(control.is_stop_requested());
    }

    #[test]
    fn zero_limits_mean_unlimited() {
        let control = RunControl::new(&bounds(0));
        assert!(!control.tick_limit_reached(1_000_000));
        assert!(!control.time_limit_reached());
    }

    #[test]
    fn tick_limit_is_inclusive() {
        let control = RunControl::new(&bounds(10));
        assert!(!control.tick_limit_reached(9));
        assert!(control.tick_limit_reached(10));
    }

    #[test]
    fn interval_swap_returns_previous() {
        let control = RunControl::new(&bounds(0));
        assert_eq!(control.set_tick_interval_ms(250), 0);
        assert_eq!(control.tick_interval_ms(), 250);
    }

    #[tokio::test]
    async fn stop_wakes_a_paused_run() {
        let control = std::sync::Arc::new(RunControl::new(&bounds(0)));
        control.pause();
        let waiter = {
            let control = std::sync::Arc::clone(&control);
            tokio::spawn(async move { control.wait_if_paused().await })
        };
        control.request_stop();
        assert!(waiter.await.is_ok());
    }
}
