//! HC-SR04 style echo-ranging sampler.
//!
//! Every ranging tick a trigger pulse is sent, unless an echo is still in
//! flight.  The echo rising edge arms a one-shot for the in-range threshold:
//!
//! ```text
//!  trigger ─┐▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁
//!  echo     ▁▁▁┌────────────────┐▁▁▁▁▁▁▁▁   held past threshold ─▶ in range
//!              ^ arm            ^ threshold
//!  echo     ▁▁▁┌──────┐▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁   fell first ─▶ out of range (silent)
//! ```
//!
//! Every edge carries the instant its ISR saw it, so classification does
//! not depend on when the event is dispatched.  Presence is reported by
//! whichever comes first of a timeout check at or past the deadline and a
//! fall stamped at or past it.  A fall before the deadline is absence.
//! Each trigger cycle raises at most one in-range event.

use embassy_time::{Duration, Instant};
use log::debug;

use crate::app::ports::RangerPort;
use crate::scheduler::OneShot;

pub struct EchoRanger {
    threshold: Duration,
    pulse_width: Duration,
    echo_high: bool,
    timeout: OneShot,
}

impl EchoRanger {
    pub fn new(threshold: Duration, pulse_width: Duration) -> Self {
        Self {
            threshold,
            pulse_width,
            echo_high: false,
            timeout: OneShot::new(),
        }
    }

    /// Ranging tick.  Emits a trigger pulse when sampling is `enabled` and no
    /// echo is in progress.  Returns whether a pulse was sent.
    pub fn sample_tick(&mut self, enabled: bool, port: &mut impl RangerPort) -> bool {
        if !enabled || self.echo_high {
            return false;
        }
        port.pulse_trigger(self.pulse_width);
        true
    }

    pub fn on_echo_rise(&mut self, now: Instant) {
        self.echo_high = true;
        self.timeout.arm(now, self.threshold);
    }

    /// Echo fell at `at`.  Returns `true` if the echo had already been
    /// high for the threshold and no timeout check reported it.
    pub fn on_echo_fall(&mut self, at: Instant) -> bool {
        let in_range = self.echo_high && self.timeout.fire_if_due(at);
        if self.timeout.is_armed() {
            debug!("ranger: echo fell before threshold, out of range");
        }
        self.echo_high = false;
        self.timeout.cancel();
        in_range
    }

    /// Check the echo timeout.  Returns `true` exactly once per trigger cycle
    /// when the echo is still high at the threshold.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        self.echo_high && self.timeout.fire_if_due(now)
    }

    pub fn echo_in_progress(&self) -> bool {
        self.echo_high
    }

    /// When the pending timeout fires, if one is armed.
    pub fn timeout_deadline(&self) -> Option<Instant> {
        self.timeout.deadline()
    }
}
