//! Input drivers, hardware initialisation, and peripheral helpers.

pub mod debounce;
pub mod hw_init;
pub mod hw_timer;
pub mod keypad;
pub mod task_pin;
pub mod watchdog;
