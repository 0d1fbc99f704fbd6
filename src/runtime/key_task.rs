//! Key worker: the single consumer of the event queue.
//!
//! Sleeps until a task-context producer raises the queue's ready signal,
//! then applies every pending event (ISR edges included) to the shared
//! alarm state.  Runs on the APP core above the row driver so a confirmed
//! press is resolved before the row can move on.

use std::io;
use std::ops::Deref;
use std::sync::Arc;
use std::thread::JoinHandle;

use futures_lite::future::block_on;
use log::{info, warn};

use super::AlarmSystem;
use crate::app::ports::{AlarmHardware, Clock, EventSink};
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::events::EventQueue;

pub const KEY_TASK_PRIORITY: u8 = 6;
pub const KEY_TASK_STACK_KB: usize = 8;

/// Consume events until `Event::Shutdown`.
pub fn run<H, S, C>(system: &AlarmSystem<H, S, C>, queue: &EventQueue)
where
    H: AlarmHardware,
    S: EventSink,
    C: Clock,
{
    info!("key worker: running");
    'outer: loop {
        block_on(queue.wait());
        let dropped = queue.take_dropped();
        if dropped > 0 {
            warn!(
                "event queue full, {} event(s) dropped ({} pending)",
                dropped,
                queue.pending()
            );
        }
        while let Some(event) = queue.pop() {
            if !system.dispatch(event) {
                break 'outer;
            }
        }
    }
    info!("key worker: stopped");
}

pub fn spawn<H, S, C, Q>(system: Arc<AlarmSystem<H, S, C>>, queue: Q) -> io::Result<JoinHandle<()>>
where
    H: AlarmHardware + Send + 'static,
    S: EventSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
    Q: Deref<Target = EventQueue> + Send + 'static,
{
    spawn_on_core(
        Core::App,
        KEY_TASK_PRIORITY,
        KEY_TASK_STACK_KB,
        "key-worker\0",
        move || run(&system, &queue),
    )
}
