//! Interrupt-driven event queue.
//!
//! Events are produced by:
//! - GPIO ISRs (keypad column edges, trigger-sensor edge, echo edges)
//! - Timer callbacks (debounce tick, ranging tick, echo one-shot)
//!
//! Events are consumed by the key worker, which applies each one to the
//! shared alarm state under its lock.  Producers never run business logic.
//!
//! ```text
//! ┌─────────────┐  push_from_isr  ┌──────────────┐
//! │ Column ISR  │────────────────▶│              │
//! │ Sensor ISR  │────────────────▶│   pending    │     ┌──────────────┐
//! │ Echo ISR    │────────────────▶│  (bounded)   │────▶│  Key worker  │
//! │ Timers      │──── push ──────▶│              │     │  (consumer)  │
//! └─────────────┘        │        └──────────────┘     └──────────────┘
//!                        └──────────── ready ──────────────────▲
//! ```
//!
//! ISRs only enqueue under the interrupt-safe critical section: no waker,
//! no logging.  Task-context producers enqueue and then raise `ready`, so
//! ISR events are picked up at the latest on the next debounce tick.
//! Timed events carry the instant they were produced, which is what the
//! service classifies against.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use heapless::Deque;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Work items pushed by ISR-equivalent contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // ── Keypad ────────────────────────────────────────────
    /// Rising edge on any keypad column line.
    ColumnRise,
    /// Falling edge on any keypad column line.
    ColumnFall,

    // ── Sensors ───────────────────────────────────────────
    /// Rising edge on the digital trigger sensor.
    TriggerRise,
    /// Falling edge on the digital trigger sensor.
    TriggerFall,
    /// Echo line went high.
    EchoRise(Instant),
    /// Echo line went low.
    EchoFall(Instant),
    /// The echo one-shot timer expired.
    EchoTimeout(Instant),

    // ── Timers ────────────────────────────────────────────
    /// Debounce poll tick (1 ms).
    DebounceTick(Instant),
    /// Ultrasonic sampling tick (500 ms).
    RangeTick,

    // ── Housekeeping ──────────────────────────────────────
    /// Stop the consumer.
    Shutdown,
}

impl Event {
    /// When the producer saw this event, for the timed variants.
    pub fn stamp(&self) -> Option<Instant> {
        match *self {
            Event::EchoRise(at)
            | Event::EchoFall(at)
            | Event::EchoTimeout(at)
            | Event::DebounceTick(at) => Some(at),
            _ => None,
        }
    }
}

/// Bounded multi-producer queue between interrupt contexts and the worker.
pub struct EventQueue {
    pending: Mutex<RefCell<Deque<Event, EVENT_QUEUE_CAP>>>,
    ready: Signal<CriticalSectionRawMutex, ()>,
    dropped: AtomicU32,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(RefCell::new(Deque::new())),
            ready: Signal::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue from interrupt context.  Never blocks, wakes or logs.
    /// Returns `false` if the queue is full (event dropped and counted).
    pub fn push_from_isr(&self, event: Event) -> bool {
        let queued =
            critical_section::with(|cs| self.pending.borrow_ref_mut(cs).push_back(event).is_ok());
        if !queued {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queued
    }

    /// Enqueue from task context and wake the consumer.
    pub fn push(&self, event: Event) -> bool {
        let queued = self.push_from_isr(event);
        self.ready.signal(());
        queued
    }

    /// Pop the next event, if any.
    pub fn pop(&self) -> Option<Event> {
        critical_section::with(|cs| self.pending.borrow_ref_mut(cs).pop_front())
    }

    /// Wait until a task-context producer has pushed since the last wait.
    pub async fn wait(&self) {
        self.ready.wait().await
    }

    /// Events dropped on a full queue since the last call.
    pub fn take_dropped(&self) -> u32 {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Events waiting to be popped.
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.pending.borrow_ref(cs).len())
    }
}

/// The queue ISRs and hardware timers push into on the device.
pub static EVENTS: EventQueue = EventQueue::new();
