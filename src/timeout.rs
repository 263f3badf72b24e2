//! Polling timeout timer
//!
//! A resettable elapsed-time check for loops that poll instead of await.
//! `is_expired` never auto-resets: once the period has elapsed it keeps
//! reporting expiry until the caller resets the timer, so a slow poller
//! cannot miss a period boundary.

use embassy_time::{Duration, Instant};

/// Tracks elapsed time since the last reset against a caller-supplied period.
///
/// Each polling loop owns its own instance; there is no sharing.
pub struct TimeoutTimer {
    last_reset: Instant,
}

impl TimeoutTimer {
    /// Create a timer with the reset reference at the current instant.
    pub fn new() -> Self {
        Self {
            last_reset: Instant::now(),
        }
    }

    /// Has at least `period` elapsed since the last reset?
    ///
    /// Precision is bounded by the time driver's tick granularity.
    pub fn is_expired(&self, period: Duration) -> bool {
        self.is_expired_at(Instant::now(), period)
    }

    /// Restart the period from the current instant.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    fn is_expired_at(&self, now: Instant, period: Duration) -> bool {
        now.saturating_duration_since(self.last_reset) >= period
    }

    fn reset_at(&mut self, now: Instant) {
        self.last_reset = now;
    }
}

impl Default for TimeoutTimer {
    fn default() -> Self {
        Self::new()
    }
}
