//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmService (domain)
//! ```
//!
//! Driven adapters (GPIO, display, watchdog, event sinks) implement these
//! traits.  The [`AlarmService`](super::service::AlarmService) consumes them
//! via generics, so the domain core never touches hardware directly.

use embassy_time::{Duration, Instant};

// ───────────────────────────────────────────────────────────────
// Keypad matrix lines
// ───────────────────────────────────────────────────────────────

/// Row-drive outputs and column-sense inputs of the 4x4 keypad.
pub trait KeypadLines {
    /// Drive `row` (0–3) high and every other row low.
    fn select_row(&mut self, row: usize);

    /// Whether column `col` (0–3) currently reads high.
    fn column_active(&mut self, col: usize) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Binary outputs
// ───────────────────────────────────────────────────────────────

/// Alarm indicators and sensor enables.
pub trait AlarmOutputs {
    /// Audible alarm.
    fn set_buzzer(&mut self, on: bool);

    /// Visual alarm indicator.
    fn set_alarm_led(&mut self, on: bool);

    /// "Key accepted" indicator.
    fn set_ack_led(&mut self, on: bool);

    /// Enable line of the digital trigger sensor.
    fn set_trigger_sensor_enabled(&mut self, enabled: bool);
}

// ───────────────────────────────────────────────────────────────
// Ultrasonic ranger
// ───────────────────────────────────────────────────────────────

/// Trigger side of the ultrasonic sensor.  Echo edges arrive as events.
pub trait RangerPort {
    /// Emit one trigger pulse of the given width.
    fn pulse_trigger(&mut self, width: Duration);
}

// ───────────────────────────────────────────────────────────────
// Character display
// ───────────────────────────────────────────────────────────────

/// 16x2 character display, consumed as an opaque collaborator.
pub trait DisplayPort {
    fn clear(&mut self);
    fn print(&mut self, text: &str);
    fn set_cursor(&mut self, col: u8, row: u8);
    fn backlight_on(&mut self);
    fn backlight_off(&mut self);
}

/// Everything the alarm core drives while holding the shared lock.
pub trait AlarmHardware: KeypadLines + AlarmOutputs + RangerPort + DisplayPort {}

impl<T: KeypadLines + AlarmOutputs + RangerPort + DisplayPort> AlarmHardware for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Platform services
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Hardware watchdog.  Resets the system unless kicked within `timeout`.
pub trait WatchdogPort {
    fn start(&mut self, timeout: Duration);
    fn kick(&mut self);
}
