//! Alarm service: the hexagonal core.
//!
//! [`AlarmService`] owns the mode machine, the keypad scanner, both intrusion
//! sensors and the display power state.  Every entry point takes the
//! hardware port, the event sink and the current time from the caller, so
//! the whole service is driven deterministically from tests.
//!
//! ```text
//!  KeypadLines ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  RangerPort  ◀── │         AlarmService         │
//!  AlarmOutputs ◀─ │  Scanner · FSM · Sensors     │
//!  DisplayPort ◀── │  DisplayPower · timers       │
//!                  └──────────────────────────────┘
//! ```
//!
//! None of these methods block.  Timed UI holds (incorrect-passcode notice,
//! key-accepted pulse) are [`OneShot`]s checked on the debounce tick.

use embassy_time::Instant;
use log::{debug, info};

use crate::config::AlarmConfig;
use crate::drivers::keypad::{Key, KeypadScanner};
use crate::fsm::context::ModeContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, KeyOutcome, Mode};
use crate::scheduler::OneShot;
use crate::sensors::{DigitalTrigger, EchoRanger};

use super::display_power::DisplayPower;
use super::events::{AppEvent, IntrusionSource};
use super::ports::{AlarmHardware, AlarmOutputs, EventSink, KeypadLines};
use super::screen::Screen;

// ───────────────────────────────────────────────────────────────
// AlarmService
// ───────────────────────────────────────────────────────────────

pub struct AlarmService {
    config: AlarmConfig,
    fsm: Fsm,
    ctx: ModeContext,
    scanner: KeypadScanner,
    trigger: DigitalTrigger,
    ranger: EchoRanger,
    display: DisplayPower,
    /// "Incorrect Passcode" hold.
    notice: OneShot,
    /// Key-accepted indicator pulse.
    ack: OneShot,
}

impl AlarmService {
    /// Construct the service.  Does **not** touch hardware: call [`start`]
    /// next.
    ///
    /// [`start`]: Self::start
    pub fn new(config: AlarmConfig) -> Self {
        let ranger = EchoRanger::new(config.echo_threshold(), config.trigger_pulse());
        let display = DisplayPower::new(config.idle_timeout());
        Self {
            fsm: Fsm::new(build_state_table(), Mode::SettingPasscode),
            ctx: ModeContext::new(),
            scanner: KeypadScanner::new(),
            trigger: DigitalTrigger::new(),
            ranger,
            display,
            notice: OneShot::new(),
            ack: OneShot::new(),
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Power row 0, enter SettingPasscode, light the display and arm the
    /// idle timer.
    pub fn start(
        &mut self,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        now: Instant,
    ) {
        self.scanner.start(hw);
        self.fsm.start(&mut self.ctx);
        self.display.touch(now);
        hw.set_ack_led(false);
        hw.backlight_on();
        self.apply_outputs(hw);
        self.redraw(hw);
        sink.emit(&AppEvent::Started(self.fsm.current_mode()));
        info!("AlarmService started in {:?}", self.fsm.current_mode());
    }

    // ── Edge inputs (no hardware access) ──────────────────────

    pub fn on_column_edge(&mut self, rising: bool) {
        let columns = self.scanner.columns_mut();
        if rising {
            columns.on_rising_edge();
        } else {
            columns.on_falling_edge();
        }
    }

    pub fn on_trigger_edge(&mut self, rising: bool) {
        if rising {
            self.trigger.on_rising_edge();
        } else {
            self.trigger.on_falling_edge();
        }
    }

    /// Echo edge seen by the ISR at `at`.  A fall at or past the threshold
    /// is an in-range echo.
    pub fn on_echo_edge(
        &mut self,
        rising: bool,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        at: Instant,
    ) {
        if rising {
            self.ranger.on_echo_rise(at);
        } else if self.ranger.on_echo_fall(at) {
            self.intrusion(IntrusionSource::Ultrasonic, hw, sink, at);
        }
    }

    // ── Periodic work ─────────────────────────────────────────

    /// One debounce period: confirm key and trigger presses, then service
    /// every pending deadline.
    pub fn debounce_tick(
        &mut self,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        now: Instant,
    ) {
        if self.scanner.columns_mut().poll_tick() {
            self.handle_confirmed_press(hw, sink, now);
        }
        if self.trigger.poll_tick() && self.ctx.outputs.sensors_enabled {
            self.intrusion(IntrusionSource::DigitalTrigger, hw, sink, now);
        }
        self.poll_timers(hw, sink, now);
    }

    /// The echo one-shot fired.
    pub fn echo_timeout(
        &mut self,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        now: Instant,
    ) {
        if self.ranger.check_timeout(now) {
            self.intrusion(IntrusionSource::Ultrasonic, hw, sink, now);
        }
    }

    /// One ranging period: blink the alarm LED while Triggered, and pulse
    /// the ranger while Armed.
    pub fn range_tick(&mut self, hw: &mut impl AlarmHardware) {
        if self.fsm.current_mode() == Mode::Triggered {
            self.ctx.outputs.alarm_led = !self.ctx.outputs.alarm_led;
            hw.set_alarm_led(self.ctx.outputs.alarm_led);
        }
        if self.ranger.sample_tick(self.ctx.outputs.sensors_enabled, hw) {
            debug!("ranger: trigger pulse sent");
        }
    }

    /// Row driver step.  Returns whether the powered row changed.
    pub fn advance_row(&mut self, lines: &mut impl KeypadLines) -> bool {
        self.scanner.advance_row_if_idle(lines)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.fsm.current_mode()
    }

    pub fn current_row(&self) -> usize {
        self.scanner.current_row()
    }

    pub fn key_pressed(&self) -> bool {
        self.scanner.columns().is_pressed()
    }

    pub fn passcode_set(&self) -> bool {
        self.ctx.stored.is_some()
    }

    pub fn entry_len(&self) -> usize {
        self.ctx.entry.len()
    }

    pub fn entering(&self) -> bool {
        self.ctx.entering
    }

    pub fn alarm_active(&self) -> bool {
        self.ctx.alarm_active()
    }

    pub fn sensors_enabled(&self) -> bool {
        self.ctx.outputs.sensors_enabled
    }

    pub fn echo_in_progress(&self) -> bool {
        self.ranger.echo_in_progress()
    }

    /// When the in-flight echo counts as in range, if one is pending.
    pub fn echo_deadline(&self) -> Option<Instant> {
        self.ranger.timeout_deadline()
    }

    pub fn display_on(&self) -> bool {
        self.display.is_on()
    }

    pub fn notice_showing(&self) -> bool {
        self.notice.is_armed()
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    /// What the display shows right now.
    pub fn screen(&self) -> Screen {
        let mode = self.fsm.current_mode();
        if self.notice.is_armed() {
            Screen::Notice
        } else if self.fsm.entry_in_progress(&self.ctx) {
            Screen::Entry {
                mode,
                filled: self.ctx.entry.len(),
            }
        } else {
            Screen::Idle(mode)
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn handle_confirmed_press(
        &mut self,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        now: Instant,
    ) {
        // Any confirmed press is activity, whether or not it maps to a key.
        let woke = self.display.touch(now);
        if woke {
            hw.backlight_on();
            sink.emit(&AppEvent::DisplayWake);
        }
        // A key press dismisses the notice early.
        let dismissed = self.notice.is_armed();
        self.notice.cancel();

        hw.set_ack_led(true);
        self.ack.arm(now, self.config.key_ack_pulse());

        let Some(key) = self.scanner.resolve_key(hw, self.config.symbol_policy) else {
            debug!("keypad: press on row {} not mapped", self.scanner.current_row());
            if woke || dismissed {
                self.redraw(hw);
            }
            return;
        };
        sink.emit(&AppEvent::KeyAccepted);

        self.dispatch_key(key, hw, sink, now);
    }

    fn dispatch_key(
        &mut self,
        key: Key,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        now: Instant,
    ) {
        let prev = self.fsm.current_mode();
        match self.fsm.handle_key(key, &mut self.ctx) {
            KeyOutcome::EntryStarted => sink.emit(&AppEvent::EntryStarted(prev)),
            KeyOutcome::Rejected { mode } => {
                info!("passcode rejected in {:?}", mode);
                self.notice.arm(now, self.config.notice_hold());
                sink.emit(&AppEvent::PasscodeRejected(mode));
            }
            KeyOutcome::Ignored
            | KeyOutcome::Digit { .. }
            | KeyOutcome::Provisioned
            | KeyOutcome::Accepted { .. } => {}
        }
        self.emit_mode_change(prev, sink);
        self.apply_outputs(hw);
        self.redraw(hw);
    }

    fn intrusion(
        &mut self,
        source: IntrusionSource,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        now: Instant,
    ) {
        let prev = self.fsm.current_mode();
        if !self.fsm.trip(&mut self.ctx) {
            return;
        }
        sink.emit(&AppEvent::Intrusion(source));
        self.emit_mode_change(prev, sink);
        self.notice.cancel();
        self.apply_outputs(hw);
        if self.display.touch(now) {
            hw.backlight_on();
            sink.emit(&AppEvent::DisplayWake);
        }
        self.redraw(hw);
    }

    fn poll_timers(
        &mut self,
        hw: &mut impl AlarmHardware,
        sink: &mut impl EventSink,
        now: Instant,
    ) {
        if self.ranger.check_timeout(now) {
            self.intrusion(IntrusionSource::Ultrasonic, hw, sink, now);
        }
        if self.ack.fire_if_due(now) {
            hw.set_ack_led(false);
        }
        if self.notice.fire_if_due(now) {
            self.redraw(hw);
        }
        if self.display.poll(now) {
            // Sleeping abandons a half-typed passcode.
            self.ctx.cancel_entry();
            self.notice.cancel();
            hw.backlight_off();
            self.redraw(hw);
            sink.emit(&AppEvent::DisplaySleep);
        }
    }

    fn emit_mode_change(&self, prev: Mode, sink: &mut impl EventSink) {
        let to = self.fsm.current_mode();
        if to != prev {
            sink.emit(&AppEvent::ModeChanged { from: prev, to });
        }
    }

    /// Translate mode output commands into port calls.
    fn apply_outputs(&self, hw: &mut impl AlarmOutputs) {
        let out = &self.ctx.outputs;
        hw.set_buzzer(out.buzzer);
        hw.set_alarm_led(out.alarm_led);
        hw.set_trigger_sensor_enabled(out.sensors_enabled);
    }

    fn redraw(&self, hw: &mut impl AlarmHardware) {
        self.screen().render(hw);
    }
}
