//! Background blink task
//!
//! A periodically-toggling output pin running alongside the root loop.
//! The task owns its pin and its sleep period; the only outside contact
//! is the control block's atomic alive flag, checked once per iteration,
//! so a stop request is observed within one sleep period.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use defmt::{debug, Format};
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use embassy_nrf::Peri;
use embassy_time::{Duration, Timer};

/// Blink task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
#[repr(u8)]
pub enum TaskState {
    Created = 0,
    Running = 1,
    Stopped = 2,
}

/// Control block shared between the spawner and the blink task.
///
/// `const`-initialized so it can live in a static.
pub struct BlinkHandle {
    alive: AtomicBool,
    state: AtomicU8,
}

impl BlinkHandle {
    pub const fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            state: AtomicU8::new(TaskState::Created as u8),
        }
    }

    /// Request the task to stop; takes effect within one sleep period.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> TaskState {
        match self.state.load(Ordering::Relaxed) {
            1 => TaskState::Running,
            2 => TaskState::Stopped,
            _ => TaskState::Created,
        }
    }

    fn set_state(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }
}

impl Default for BlinkHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Toggle `pin` every `period` until the handle's alive flag clears.
#[embassy_executor::task]
pub async fn blink_task(pin: Peri<'static, AnyPin>, period: Duration, handle: &'static BlinkHandle) {
    let mut led = Output::new(pin, Level::Low, OutputDrive::Standard);
    handle.set_state(TaskState::Running);
    debug!("blink task running");

    while handle.is_alive() {
        led.toggle();
        Timer::after(period).await;
    }

    // Release the pin before publishing the terminal state.
    drop(led);
    handle.set_state(TaskState::Stopped);
    debug!("blink task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_starts_created_and_alive() {
        let handle = BlinkHandle::new();
        assert_eq!(handle.state(), TaskState::Created);
        assert!(handle.is_alive());
    }

    #[test]
    fn test_stop_clears_alive_flag() {
        let handle = BlinkHandle::new();
        handle.stop();
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_state_transitions() {
        let handle = BlinkHandle::new();

        // The task body drives Created -> Running -> Stopped.
        handle.set_state(TaskState::Running);
        assert_eq!(handle.state(), TaskState::Running);

        handle.stop();
        handle.set_state(TaskState::Stopped);
        assert_eq!(handle.state(), TaskState::Stopped);
        assert!(!handle.is_alive());
    }
}
