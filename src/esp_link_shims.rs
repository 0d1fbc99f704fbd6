//! ESP-IDF time driver symbols for embassy-time.
//!
//! `critical-section` comes from esp-idf-hal (interrupt-safe, usable from
//! the GPIO ISRs that push into the event queue), so only the time driver
//! lives here.

use core::time::Duration;

/// Microseconds since boot, the tick unit embassy-time is configured for.
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    // SAFETY: reads the high-resolution timer counter; no preconditions.
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    us.max(0) as u64
}

/// Wake `waker` once `at` has passed.
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }

    // SAFETY: embassy-time passes a valid `Waker` for the duration of the
    // call; it is cloned before returning.
    let waker = unsafe { (*(waker as *const core::task::Waker)).clone() };
    std::thread::spawn(move || {
        let now = _embassy_time_now();
        if at > now {
            std::thread::sleep(Duration::from_micros(at - now));
        }
        waker.wake();
    });
}
