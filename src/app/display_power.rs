//! Idle timeout and display power state.

use embassy_time::{Duration, Instant};

use crate::scheduler::OneShot;

/// `DisplayPower`: on/off plus the re-armable idle deadline.
#[derive(Debug)]
pub struct DisplayPower {
    on: bool,
    idle_timeout: Duration,
    idle: OneShot,
}

impl DisplayPower {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            on: true,
            idle_timeout,
            idle: OneShot::new(),
        }
    }

    /// Record user input.  Re-arms the idle timer and returns `true` when the
    /// display was off and must be woken.
    pub fn touch(&mut self, now: Instant) -> bool {
        self.idle.arm(now, self.idle_timeout);
        let woke = !self.on;
        self.on = true;
        woke
    }

    /// Returns `true` once when the idle timeout has elapsed with the display on.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.idle.fire_if_due(now) && self.on {
            self.on = false;
            return true;
        }
        false
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
