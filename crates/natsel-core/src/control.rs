//! Shared run control for the tick loop.
//!
//! A [`RunControl`] is wrapped in [`std::sync::Arc`] and shared between the
//! task driving [`run_simulation`](crate::runner::run_simulation) and
//! whatever starts, stops, or paces the run (a signal handler, a UI
//! bridge). All fields are atomics so the loop never takes a lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Reached the configured `max_ticks`.
    MaxTicksReached,
    /// A stop was requested.
    Stopped,
}

/// Pause, stop, and pacing state for a running simulation.
#[derive(Debug)]
pub struct RunControl {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    tick_interval_ms: AtomicU64,
    max_ticks: u64,
}

impl RunControl {
    /// Create control state with the given pacing and tick limit
    /// (0 = unlimited).
    pub fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks,
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the loop after the current tick.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume a paused loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Ask the loop to stop before its next tick. Also wakes a paused loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Pacing
    // -----------------------------------------------------------------------

    /// Current delay between ticks, in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the delay between ticks. Returns the previous value.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    /// Configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `ticks_run` has reached the limit.
    pub const fn tick_limit_reached(&self, ticks_run: u64) -> bool {
        self.max_ticks > 0 && ticks_run >= self.max_ticks
    }
}
