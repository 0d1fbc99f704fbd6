//! Timer primitives shared by the alarm core.
//!
//! Every timed behaviour in the core (idle timeout, echo timeout, notice
//! hold, key-accepted pulse) is a [`OneShot`] polled against an injected
//! `now`.  Nothing here sleeps, so a pending timer can never stall the
//! supervisory loop.
//!
//! ```text
//!   arm(now, d) ──▶ [deadline = now + d] ──fire_if_due(t >= deadline)──▶ true (once)
//!        ▲                  │
//!        └──── re-arm ──────┘  (replaces the pending firing)
//! ```

use embassy_time::{Duration, Instant};

// ═══════════════════════════════════════════════════════════════
//  One-shot deadline
// ═══════════════════════════════════════════════════════════════

/// A re-armable one-shot timer.
///
/// Arming always replaces any pending firing; a deadline fires at most once
/// per arming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShot {
    deadline: Option<Instant>,
}

impl OneShot {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm (or re-arm) to fire `after` from `now`.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Drop any pending firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once when `now` has reached the deadline,
    /// disarming the timer.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Periodic divider
// ═══════════════════════════════════════════════════════════════

/// Derives a slower periodic tick from a faster base tick.
///
/// The host tick source uses this to produce the ranging tick from the
/// debounce tick; on the device both are independent hardware timers.
#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    period_ticks: u32,
    elapsed: u32,
}

impl Periodic {
    /// `period` expressed in multiples of `base`.  A period shorter than the
    /// base fires on every base tick.
    pub fn new(period: Duration, base: Duration) -> Self {
        let base_us = base.as_micros().max(1);
        let period_ticks = (period.as_micros() / base_us).max(1);
        Self {
            period_ticks: u32::try_from(period_ticks).unwrap_or(u32::MAX),
            elapsed: 0,
        }
    }

    /// Advance by one base tick.  Returns `true` when the period elapses.
    pub fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.period_ticks {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}
