//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the alarm's business rules: key handling, the
//! passcode-gated mode machine, intrusion handling and display power.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod display_power;
pub mod events;
pub mod ports;
pub mod screen;
pub mod service;
