//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API to reset the device if the row driver stalls
//! for longer than the configured timeout.  `start()` subscribes the
//! *calling* task, so it must run on the row driver thread.
//!
//! The host build keeps statistics instead: a cloneable [`KickStats`]
//! handle lets tests prove the loop keeps kicking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use embassy_time::Duration;
use log::info;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::WatchdogPort;

/// Kick counters shared between the watchdog and observers.
#[derive(Debug, Clone, Default)]
pub struct KickStats {
    kicks: Arc<AtomicU64>,
    max_gap_us: Arc<AtomicU64>,
}

impl KickStats {
    pub fn kicks(&self) -> u64 {
        self.kicks.load(Ordering::Acquire)
    }

    /// Longest interval seen between two consecutive kicks.
    pub fn max_gap(&self) -> core::time::Duration {
        core::time::Duration::from_micros(self.max_gap_us.load(Ordering::Acquire))
    }

    fn record(&self, gap: Option<core::time::Duration>) {
        if let Some(gap) = gap {
            let us = u64::try_from(gap.as_micros()).unwrap_or(u64::MAX);
            self.max_gap_us.fetch_max(us, Ordering::AcqRel);
        }
        self.kicks.fetch_add(1, Ordering::AcqRel);
    }
}

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    stats: KickStats,
    last_kick: Option<std::time::Instant>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            subscribed: false,
            stats: KickStats::default(),
            last_kick: None,
        }
    }

    pub fn stats(&self) -> KickStats {
        self.stats.clone()
    }
}

impl WatchdogPort for Watchdog {
    #[cfg(target_os = "espidf")]
    fn start(&mut self, timeout: Duration) {
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        // SAFETY: plain FFI calls; the config struct lives for the call and
        // a null task handle means "the calling task".
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!(
                    "TWDT reconfigure returned {} (may already be configured)",
                    ret
                );
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            self.subscribed = ret == ESP_OK;
            if self.subscribed {
                info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
            } else {
                log::warn!("Watchdog: failed to subscribe ({})", ret);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn start(&mut self, timeout: Duration) {
        info!("Watchdog(sim): armed, {}ms timeout", timeout.as_millis());
        self.last_kick = Some(std::time::Instant::now());
    }

    fn kick(&mut self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the calling (subscribed) task.
            unsafe {
                esp_task_wdt_reset();
            }
        }

        let now = std::time::Instant::now();
        self.stats
            .record(self.last_kick.map(|prev| now.duration_since(prev)));
        self.last_kick = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kicks_are_counted() {
        let mut wd = Watchdog::new();
        let stats = wd.stats();
        wd.start(Duration::from_millis(5_000));
        wd.kick();
        wd.kick();
        assert_eq!(stats.kicks(), 2);
    }

    #[test]
    fn max_gap_tracks_longest_interval() {
        let mut wd = Watchdog::new();
        let stats = wd.stats();
        wd.start(Duration::from_millis(5_000));
        wd.kick();
        std::thread::sleep(std::time::Duration::from_millis(20));
        wd.kick();
        assert!(stats.max_gap() >= core::time::Duration::from_millis(20));
        assert!(stats.max_gap() < core::time::Duration::from_secs(5));
    }
}
