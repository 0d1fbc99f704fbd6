//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                      | Connects to               |
//! |------------|---------------------------------|---------------------------|
//! | `hardware` | KeypadLines, AlarmOutputs,      | `embedded-hal` GPIO pins, |
//! |            | RangerPort, DisplayPort         | `DelayNs`, a display      |
//! | `display`  | DisplayPort                     | In-memory 16x2 LCD        |
//! | `log_sink` | EventSink                       | Serial log output         |
//! | `time`     | Clock                           | ESP32 system timer        |
//!
//! The watchdog adapter lives with the drivers
//! ([`crate::drivers::watchdog`]).

pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod time;
