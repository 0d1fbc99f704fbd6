//! Simulated alarm board for integration tests.
//!
//! Models the keypad as a real matrix: a held key raises its column only
//! while its row is powered, and every level change is pushed into the
//! event queue as a column edge, the way the GPIO ISR does on the device.
//! Outputs and the LCD are recorded so tests can assert on them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embassy_time::{Duration, Instant};
use keyguard::adapters::display::LcdBuffer;
use keyguard::adapters::time::ManualClock;
use keyguard::app::events::AppEvent;
use keyguard::app::ports::{
    AlarmOutputs, Clock, DisplayPort, EventSink, KeypadLines, RangerPort,
};
use keyguard::app::service::AlarmService;
use keyguard::config::AlarmConfig;
use keyguard::drivers::keypad::KEYPAD_GRID;
use keyguard::events::{Event, EventQueue};
use keyguard::fsm::Mode;
use keyguard::runtime::AlarmSystem;

// ── Board state ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct BoardState {
    pub row: usize,
    pub held: Option<(usize, usize)>,
    pub buzzer: bool,
    pub alarm_led: bool,
    pub ack_led: bool,
    pub trigger_enabled: bool,
    pub alarm_led_toggles: usize,
    pub pulses: usize,
    pub lcd: LcdBuffer,
}

impl BoardState {
    fn column_high(&self) -> bool {
        matches!(self.held, Some((r, _)) if r == self.row)
    }
}

fn lock(state: &Mutex<BoardState>) -> MutexGuard<'_, BoardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── MockBoard (owned by the alarm system) ─────────────────────

pub struct MockBoard {
    state: Arc<Mutex<BoardState>>,
    queue: Arc<EventQueue>,
}

impl KeypadLines for MockBoard {
    fn select_row(&mut self, row: usize) {
        let mut s = lock(&self.state);
        let before = s.column_high();
        s.row = row;
        let after = s.column_high();
        if before != after {
            self.queue
                .push_from_isr(if after { Event::ColumnRise } else { Event::ColumnFall });
        }
    }

    fn column_active(&mut self, col: usize) -> bool {
        let s = lock(&self.state);
        s.column_high() && s.held.is_some_and(|(_, c)| c == col)
    }
}

impl AlarmOutputs for MockBoard {
    fn set_buzzer(&mut self, on: bool) {
        lock(&self.state).buzzer = on;
    }

    fn set_alarm_led(&mut self, on: bool) {
        let mut s = lock(&self.state);
        if s.alarm_led != on {
            s.alarm_led_toggles += 1;
        }
        s.alarm_led = on;
    }

    fn set_ack_led(&mut self, on: bool) {
        lock(&self.state).ack_led = on;
    }

    fn set_trigger_sensor_enabled(&mut self, enabled: bool) {
        lock(&self.state).trigger_enabled = enabled;
    }
}

impl RangerPort for MockBoard {
    fn pulse_trigger(&mut self, _width: Duration) {
        lock(&self.state).pulses += 1;
    }
}

impl DisplayPort for MockBoard {
    fn clear(&mut self) {
        lock(&self.state).lcd.clear();
    }

    fn print(&mut self, text: &str) {
        lock(&self.state).lcd.print(text);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        lock(&self.state).lcd.set_cursor(col, row);
    }

    fn backlight_on(&mut self) {
        lock(&self.state).lcd.backlight_on();
    }

    fn backlight_off(&mut self) {
        lock(&self.state).lcd.backlight_off();
    }
}

// ── Keypad handle (the user's finger) ─────────────────────────

#[derive(Clone)]
pub struct Keypad {
    state: Arc<Mutex<BoardState>>,
    queue: Arc<EventQueue>,
}

#[allow(dead_code)]
impl Keypad {
    pub fn press(&self, key: char) {
        let (r, c) = locate(key);
        let mut s = lock(&self.state);
        s.held = Some((r, c));
        if s.row == r {
            self.queue.push_from_isr(Event::ColumnRise);
        }
    }

    pub fn release(&self) {
        let mut s = lock(&self.state);
        if s.column_high() {
            self.queue.push_from_isr(Event::ColumnFall);
        }
        s.held = None;
    }

    pub fn state(&self) -> MutexGuard<'_, BoardState> {
        lock(&self.state)
    }

    pub fn lines(&self) -> [String; 2] {
        self.state().lcd.lines()
    }
}

fn locate(key: char) -> (usize, usize) {
    for (r, row) in KEYPAD_GRID.iter().enumerate() {
        if let Some(c) = row.iter().position(|&k| k == key) {
            return (r, c);
        }
    }
    panic!("no key '{key}' on the keypad");
}

/// A queue, a board wired to it and the handle that presses its keys.
pub fn board() -> (MockBoard, Keypad, Arc<EventQueue>) {
    let state = Arc::new(Mutex::new(BoardState::default()));
    let queue = Arc::new(EventQueue::new());
    let board = MockBoard {
        state: Arc::clone(&state),
        queue: Arc::clone(&queue),
    };
    let keypad = Keypad {
        state,
        queue: Arc::clone(&queue),
    };
    (board, keypad, queue)
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events().contains(event)
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

// ── Lock-step harness ─────────────────────────────────────────

/// Drives the system one millisecond at a time on a manual clock: one
/// debounce tick, every queued edge, then one row-driver step.
pub struct Harness {
    pub system: AlarmSystem<MockBoard, RecordingSink, ManualClock>,
    pub keypad: Keypad,
    pub sink: RecordingSink,
    pub queue: Arc<EventQueue>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(config: AlarmConfig) -> Self {
        let (board, keypad, queue) = board();
        let sink = RecordingSink::default();
        let system = AlarmSystem::new(
            AlarmService::new(config),
            board,
            sink.clone(),
            ManualClock::new(),
        );
        system.start();
        Self {
            system,
            keypad,
            sink,
            queue,
        }
    }

    pub fn step(&self) {
        self.system.clock().advance(Duration::from_millis(1));
        self.queue.push(Event::DebounceTick(self.now()));
        self.drain();
        self.system.scan_row();
    }

    pub fn drain(&self) {
        while let Some(event) = self.queue.pop() {
            self.system.dispatch(event);
        }
    }

    pub fn run_ms(&self, ms: u64) {
        for _ in 0..ms {
            self.step();
        }
    }

    /// Press and release one key, waiting for the press to be confirmed.
    pub fn tap(&self, key: char) {
        self.keypad.press(key);
        for _ in 0..20 {
            self.step();
            if self.system.with(|svc, _| svc.key_pressed()) {
                break;
            }
        }
        assert!(
            self.system.with(|svc, _| svc.key_pressed()),
            "press of '{key}' was never confirmed"
        );
        self.keypad.release();
        self.run_ms(3);
    }

    pub fn type_str(&self, keys: &str) {
        for key in keys.chars() {
            self.tap(key);
        }
    }

    pub fn now(&self) -> Instant {
        self.system.clock().now()
    }

    /// Queue an event and dispatch everything pending.
    pub fn inject(&self, event: Event) {
        self.queue.push(event);
        self.drain();
    }

    pub fn mode(&self) -> Mode {
        self.system.with(|svc, _| svc.mode())
    }

    /// Provision "1234" and arm.
    pub fn armed_1234(config: AlarmConfig) -> Self {
        let h = Self::new(config);
        h.type_str("1234");
        h.type_str("A1234");
        assert_eq!(h.mode(), Mode::Armed);
        h.sink.clear();
        h
    }
}
