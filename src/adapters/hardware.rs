//! Hardware adapter: bridges `embedded-hal` pins to the domain port traits.
//!
//! Owns every row/indicator output, the column inputs, a microsecond delay
//! for the ranger trigger pulse and the character display.  Pin errors are
//! logged and swallowed: a failed write must never stop the alarm loop.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin, OutputPin, PinState};
use log::warn;

use crate::app::ports::{AlarmOutputs, DisplayPort, KeypadLines, RangerPort};
use crate::drivers::keypad::{COLS, ROWS};

/// Every GPIO the alarm core drives or senses.
pub struct AlarmPins<O, I> {
    pub rows: [O; ROWS],
    pub cols: [I; COLS],
    pub trigger_enable: O,
    pub ranger_trigger: O,
    pub buzzer: O,
    pub alarm_led: O,
    pub ack_led: O,
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HalHardware<O, I, D, L> {
    pins: AlarmPins<O, I>,
    delay: D,
    display: L,
}

impl<O, I, D, L> HalHardware<O, I, D, L>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    L: DisplayPort,
{
    pub fn new(pins: AlarmPins<O, I>, delay: D, display: L) -> Self {
        Self {
            pins,
            delay,
            display,
        }
    }

    pub fn display(&self) -> &L {
        &self.display
    }

    pub fn pins(&self) -> &AlarmPins<O, I> {
        &self.pins
    }
}

fn drive(pin: &mut impl OutputPin, high: bool, what: &str) {
    if let Err(e) = pin.set_state(PinState::from(high)) {
        warn!("hardware: {} write failed: {:?}", what, e.kind());
    }
}

// ── KeypadLines ───────────────────────────────────────────────

impl<O, I, D, L> KeypadLines for HalHardware<O, I, D, L>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    L: DisplayPort,
{
    fn select_row(&mut self, row: usize) {
        for (i, pin) in self.pins.rows.iter_mut().enumerate() {
            drive(pin, i == row, "row");
        }
    }

    fn column_active(&mut self, col: usize) -> bool {
        let Some(pin) = self.pins.cols.get_mut(col) else {
            return false;
        };
        pin.is_high().unwrap_or_else(|e| {
            warn!("hardware: column {} read failed: {:?}", col, e.kind());
            false
        })
    }
}

// ── AlarmOutputs ──────────────────────────────────────────────

impl<O, I, D, L> AlarmOutputs for HalHardware<O, I, D, L>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    L: DisplayPort,
{
    fn set_buzzer(&mut self, on: bool) {
        drive(&mut self.pins.buzzer, on, "buzzer");
    }

    fn set_alarm_led(&mut self, on: bool) {
        drive(&mut self.pins.alarm_led, on, "alarm led");
    }

    fn set_ack_led(&mut self, on: bool) {
        drive(&mut self.pins.ack_led, on, "ack led");
    }

    fn set_trigger_sensor_enabled(&mut self, enabled: bool) {
        drive(&mut self.pins.trigger_enable, enabled, "trigger enable");
    }
}

// ── RangerPort ────────────────────────────────────────────────

impl<O, I, D, L> RangerPort for HalHardware<O, I, D, L>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    L: DisplayPort,
{
    fn pulse_trigger(&mut self, width: Duration) {
        let us = u32::try_from(width.as_micros()).unwrap_or(u32::MAX);
        drive(&mut self.pins.ranger_trigger, true, "ranger trigger");
        self.delay.delay_us(us);
        drive(&mut self.pins.ranger_trigger, false, "ranger trigger");
    }
}

// ── DisplayPort (delegated) ───────────────────────────────────

impl<O, I, D, L> DisplayPort for HalHardware<O, I, D, L>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
    L: DisplayPort,
{
    fn clear(&mut self) {
        self.display.clear();
    }

    fn print(&mut self, text: &str) {
        self.display.print(text);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.display.set_cursor(col, row);
    }

    fn backlight_on(&mut self) {
        self.display.backlight_on();
    }

    fn backlight_off(&mut self) {
        self.display.backlight_off();
    }
}
