//! Row driver: rotates the powered keypad row and kicks the watchdog.
//!
//! The watchdog is subscribed from inside this thread, so a stall here (a
//! deadlock on the shared lock, a runaway handler) resets the device.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use embassy_time::Duration;
use log::info;

use super::AlarmSystem;
use crate::app::ports::{AlarmHardware, Clock, EventSink, WatchdogPort};
use crate::drivers::task_pin::{Core, spawn_on_core};

pub const ROW_TASK_PRIORITY: u8 = 5;
pub const ROW_TASK_STACK_KB: usize = 4;

pub fn run<H, S, C>(
    system: &AlarmSystem<H, S, C>,
    watchdog: &mut impl WatchdogPort,
    timeout: Duration,
    interval: Duration,
    stop: &AtomicBool,
) where
    H: AlarmHardware,
    S: EventSink,
    C: Clock,
{
    watchdog.start(timeout);
    let pause = std::time::Duration::from_micros(interval.as_micros());
    info!("row driver: running every {}ms", interval.as_millis());

    while !stop.load(Ordering::Acquire) {
        system.scan_row();
        watchdog.kick();
        std::thread::sleep(pause);
    }
    info!("row driver: stopped");
}

pub fn spawn<H, S, C, W>(
    system: Arc<AlarmSystem<H, S, C>>,
    mut watchdog: W,
    stop: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>>
where
    H: AlarmHardware + Send + 'static,
    S: EventSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
    W: WatchdogPort + Send + 'static,
{
    let (timeout, interval) = system.with(|svc, _| {
        (
            svc.config().watchdog_timeout(),
            svc.config().row_scan_interval(),
        )
    });
    spawn_on_core(
        Core::App,
        ROW_TASK_PRIORITY,
        ROW_TASK_STACK_KB,
        "row-driver\0",
        move || run(&system, &mut watchdog, timeout, interval, &stop),
    )
}
