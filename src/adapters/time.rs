//! Clock adapters.
//!
//! - **`target_os = "espidf"`**: [`SystemClock`] reads embassy-time's
//!   `Instant::now()`, backed by `esp_timer_get_time()`.
//! - **`not(target_os = "espidf")`**: [`SystemClock`] uses
//!   `std::time::Instant` relative to construction.
//!
//! [`ManualClock`] only moves when told to; tests drive time with it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use embassy_time::{Duration, Instant};

use crate::app::ports::Clock;

/// Monotonic time since boot.  Clones share the same epoch.
#[derive(Debug, Clone)]
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    #[cfg(target_os = "espidf")]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[cfg(not(target_os = "espidf"))]
    fn now(&self) -> Instant {
        let us = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);
        Instant::from_micros(us)
    }
}

/// A shared clock advanced explicitly.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.micros.fetch_add(by.as_micros(), Ordering::AcqRel);
    }

    pub fn set(&self, at: Instant) {
        self.micros.store(at.as_micros(), Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.micros.load(Ordering::Acquire))
    }
}
