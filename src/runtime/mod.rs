//! Supervisory runtime: the shared alarm state and the threads that drive it.
//!
//! ```text
//!   ISRs / timers ──▶ EventQueue ──▶ key worker ──┐
//!                                                 ├──▶ Mutex<Shared> ──▶ AlarmService
//!   row driver (+ watchdog kick) ─────────────────┘
//! ```
//!
//! Both workers take the same lock, so a key resolution always sees the
//! row that was powered when the press was confirmed.  Nothing that runs
//! under the lock blocks, which keeps the row driver kicking the watchdog
//! while the "Incorrect Passcode" notice is up.

pub mod key_task;
pub mod row_task;

use std::io;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use embassy_time::Instant;
use log::{info, warn};

use crate::app::ports::{AlarmHardware, Clock, EventSink, WatchdogPort};
use crate::app::service::AlarmService;
use crate::drivers::hw_timer;
use crate::events::{Event, EventQueue};

struct Shared<H, S> {
    service: AlarmService,
    hw: H,
    sink: S,
}

/// The alarm service together with the hardware and sink it drives.
pub struct AlarmSystem<H, S, C> {
    shared: Mutex<Shared<H, S>>,
    clock: C,
}

impl<H, S, C> AlarmSystem<H, S, C>
where
    H: AlarmHardware,
    S: EventSink,
    C: Clock,
{
    pub fn new(service: AlarmService, hw: H, sink: S, clock: C) -> Self {
        Self {
            shared: Mutex::new(Shared { service, hw, sink }),
            clock,
        }
    }

    /// Power the first row, enter SettingPasscode and light the display.
    pub fn start(&self) {
        let now = self.clock.now();
        let mut guard = self.lock();
        let shared = &mut *guard;
        shared.service.start(&mut shared.hw, &mut shared.sink, now);
    }

    /// Apply one queued event.  Timed events are applied at the instant
    /// their producer stamped; the rest at the current time.  Returns
    /// `false` when the event asks the consumer to stop.
    pub fn dispatch(&self, event: Event) -> bool {
        let now = event.stamp().unwrap_or_else(|| self.clock.now());
        self.dispatch_at(event, now)
    }

    fn dispatch_at(&self, event: Event, now: Instant) -> bool {
        if event == Event::Shutdown {
            return false;
        }

        let echo_deadline = {
            let mut guard = self.lock();
            let Shared { service, hw, sink } = &mut *guard;
            match event {
                Event::ColumnRise => service.on_column_edge(true),
                Event::ColumnFall => service.on_column_edge(false),
                Event::TriggerRise => service.on_trigger_edge(true),
                Event::TriggerFall => service.on_trigger_edge(false),
                Event::EchoRise(_) => service.on_echo_edge(true, hw, sink, now),
                Event::EchoFall(_) => service.on_echo_edge(false, hw, sink, now),
                Event::EchoTimeout(_) => service.echo_timeout(hw, sink, now),
                Event::DebounceTick(_) => service.debounce_tick(hw, sink, now),
                Event::RangeTick => service.range_tick(hw),
                Event::Shutdown => {}
            }
            service.echo_deadline()
        };

        // The one-shot targets the deadline taken from the rise stamp, not
        // from when the rise was dispatched.
        match (event, echo_deadline) {
            (Event::EchoRise(_), Some(deadline)) => {
                hw_timer::arm_echo_timeout(deadline.saturating_duration_since(self.clock.now()));
            }
            (Event::EchoFall(_), _) => hw_timer::cancel_echo_timeout(),
            _ => {}
        }
        true
    }

    /// One row-driver step.  Returns whether the powered row changed.
    pub fn scan_row(&self) -> bool {
        let mut guard = self.lock();
        let Shared { service, hw, .. } = &mut *guard;
        service.advance_row(hw)
    }

    /// Inspect the service and hardware under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&AlarmService, &H) -> R) -> R {
        let guard = self.lock();
        f(&guard.service, &guard.hw)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn lock(&self) -> MutexGuard<'_, Shared<H, S>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handles of the two worker threads.
pub struct Runtime<Q> {
    queue: Q,
    stop: Arc<AtomicBool>,
    key_worker: Option<JoinHandle<()>>,
    row_driver: Option<JoinHandle<()>>,
}

impl<Q> Runtime<Q>
where
    Q: Deref<Target = EventQueue> + Clone + Send + 'static,
{
    /// Spawn the key worker and the row driver.  The system should already
    /// be started.
    pub fn spawn<H, S, C, W>(
        system: Arc<AlarmSystem<H, S, C>>,
        queue: Q,
        watchdog: W,
    ) -> io::Result<Self>
    where
        H: AlarmHardware + Send + 'static,
        S: EventSink + Send + 'static,
        C: Clock + Send + Sync + 'static,
        W: WatchdogPort + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let key_worker = key_task::spawn(Arc::clone(&system), queue.clone())?;
        let row_driver = match row_task::spawn(system, watchdog, Arc::clone(&stop)) {
            Ok(handle) => handle,
            Err(e) => {
                queue.push(Event::Shutdown);
                if key_worker.join().is_err() {
                    warn!("runtime: key worker panicked");
                }
                return Err(e);
            }
        };

        info!("runtime: workers running");
        Ok(Self {
            queue,
            stop,
            key_worker: Some(key_worker),
            row_driver: Some(row_driver),
        })
    }

    /// Stop both workers and wait for them.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Release);
        while !self.queue.push(Event::Shutdown) {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        self.join_all();
        info!("runtime: stopped");
    }

    /// Block until both workers exit.  On the device they never do.
    pub fn join(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        for (name, handle) in [
            ("key worker", self.key_worker.take()),
            ("row driver", self.row_driver.take()),
        ] {
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    warn!("runtime: {} panicked", name);
                }
            }
        }
    }
}
