//! Tick sources built on ESP-IDF's esp_timer API.
//!
//! - periodic debounce tick (1 ms) → [`Event::DebounceTick`]
//! - periodic ranging tick (500 ms) → [`Event::RangeTick`]
//! - echo one-shot, armed on every echo rise → [`Event::EchoTimeout`]
//!
//! Timer callbacks execute in the esp_timer task context (not ISR), stamp
//! the time and push into the event queue, which wakes the key worker.  On
//! simulation targets a plain thread sleeps and pushes the two periodic
//! ticks stamped from the shared clock; the echo timeout is covered by the
//! service polling its deadline on every debounce tick.

use embassy_time::Duration;

use crate::config::AlarmConfig;
#[cfg(target_os = "espidf")]
use crate::events::{EVENTS, Event};
#[cfg(target_os = "espidf")]
use embassy_time::Instant;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init::HwInitError;

#[cfg(target_os = "espidf")]
static mut DEBOUNCE_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut RANGE_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut ECHO_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: ECHO_TIMER is written once in `start_timers()` before the key
/// worker (its only other user) is spawned.
#[cfg(target_os = "espidf")]
unsafe fn echo_timer() -> esp_timer_handle_t { unsafe { ECHO_TIMER } }

#[cfg(target_os = "espidf")]
unsafe extern "C" fn debounce_tick_cb(_arg: *mut core::ffi::c_void) {
    EVENTS.push(Event::DebounceTick(Instant::now()));
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn range_tick_cb(_arg: *mut core::ffi::c_void) {
    EVENTS.push(Event::RangeTick);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn echo_timeout_cb(_arg: *mut core::ffi::c_void) {
    EVENTS.push(Event::EchoTimeout(Instant::now()));
}

#[cfg(target_os = "espidf")]
unsafe fn create(
    name: &'static [u8],
    cb: unsafe extern "C" fn(*mut core::ffi::c_void),
    out: *mut esp_timer_handle_t,
) -> Result<(), HwInitError> {
    let args = esp_timer_create_args_t {
        callback: Some(cb),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: name.as_ptr() as *const _,
        skip_unhandled_events: true,
    };
    let ret = unsafe { esp_timer_create(&args, out) };
    if ret != ESP_OK {
        return Err(HwInitError::TimerFailed(ret));
    }
    Ok(())
}

/// Create and start the periodic tick timers and the echo one-shot.
#[cfg(target_os = "espidf")]
pub fn start_timers(config: &AlarmConfig) -> Result<(), HwInitError> {
    // SAFETY: the handles are written here once at boot from the main task
    // before any callback can fire or the key worker exists.
    unsafe {
        create(b"debounce\0", debounce_tick_cb, &raw mut DEBOUNCE_TIMER)?;
        create(b"range\0", range_tick_cb, &raw mut RANGE_TIMER)?;
        create(b"echo\0", echo_timeout_cb, &raw mut ECHO_TIMER)?;

        let ret = esp_timer_start_periodic(DEBOUNCE_TIMER, config.debounce_poll().as_micros());
        if ret != ESP_OK {
            return Err(HwInitError::TimerFailed(ret));
        }
        let ret = esp_timer_start_periodic(RANGE_TIMER, config.range_period().as_micros());
        if ret != ESP_OK {
            return Err(HwInitError::TimerFailed(ret));
        }
    }

    info!(
        "hw_timer: debounce@{}ms + range@{}ms started",
        config.debounce_poll_ms, config.range_period_ms
    );
    Ok(())
}

/// (Re-)arm the echo one-shot to fire `after` from now.  Re-arming
/// replaces any pending firing.
#[cfg(target_os = "espidf")]
pub fn arm_echo_timeout(after: Duration) {
    // SAFETY: echo_timer() contract; stopping an idle timer only returns
    // ESP_ERR_INVALID_STATE, which is ignored.
    unsafe {
        let t = echo_timer();
        if t.is_null() {
            return;
        }
        esp_timer_stop(t);
        let ret = esp_timer_start_once(t, after.as_micros().max(1));
        if ret != ESP_OK {
            log::warn!("hw_timer: echo one-shot start failed (rc={})", ret);
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn cancel_echo_timeout() {
    // SAFETY: echo_timer() contract.
    unsafe {
        let t = echo_timer();
        if !t.is_null() {
            esp_timer_stop(t);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_echo_timeout(_after: Duration) {}

#[cfg(not(target_os = "espidf"))]
pub fn cancel_echo_timeout() {}

// ── Simulation tick source ────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use sim::{SimTicker, start_timers};

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::io;
    use std::ops::Deref;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread::JoinHandle;

    use super::AlarmConfig;
    use crate::app::ports::Clock;
    use crate::drivers::task_pin::{Core, spawn_on_core};
    use crate::events::{Event, EventQueue};
    use crate::scheduler::Periodic;

    /// Host stand-in for the two esp_timer periodic timers.
    pub struct SimTicker {
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    }

    impl SimTicker {
        pub fn stop(mut self) {
            self.halt();
        }

        fn halt(&mut self) {
            self.stop.store(true, Ordering::Release);
            if let Some(handle) = self.handle.take() {
                if handle.join().is_err() {
                    log::warn!("hw_timer(sim): tick thread panicked");
                }
            }
        }
    }

    impl Drop for SimTicker {
        fn drop(&mut self) {
            self.halt();
        }
    }

    /// Push `DebounceTick` every debounce period and `RangeTick` every
    /// ranging period into `queue` until stopped.  Ticks are stamped from
    /// `clock`, which must be the clock the consumer dispatches with.
    pub fn start_timers<Q, C>(config: &AlarmConfig, queue: Q, clock: C) -> io::Result<SimTicker>
    where
        Q: Deref<Target = EventQueue> + Send + 'static,
        C: Clock + Send + 'static,
    {
        let base = config.debounce_poll();
        let mut range = Periodic::new(config.range_period(), base);
        let period = std::time::Duration::from_micros(base.as_micros());
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = spawn_on_core(Core::Pro, 10, 16, "sim-ticker\0", move || {
            while !flag.load(Ordering::Acquire) {
                std::thread::sleep(period);
                queue.push(Event::DebounceTick(clock.now()));
                if range.tick() {
                    queue.push(Event::RangeTick);
                }
            }
        })?;

        log::info!("hw_timer(sim): tick thread started");
        Ok(SimTicker {
            stop,
            handle: Some(handle),
        })
    }
}
