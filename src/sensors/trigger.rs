//! Digital trigger sensor (PIR / sound module with a binary output).
//!
//! The line is debounced exactly like a keypad column.  A confirmed rising
//! level is a trigger; whether it trips the alarm is decided by the mode
//! machine.

use crate::drivers::debounce::DebouncedInput;

#[derive(Debug, Default)]
pub struct DigitalTrigger {
    input: DebouncedInput,
}

impl DigitalTrigger {
    pub const fn new() -> Self {
        Self {
            input: DebouncedInput::new(),
        }
    }

    pub fn on_rising_edge(&mut self) {
        self.input.on_rising_edge();
    }

    pub fn on_falling_edge(&mut self) {
        self.input.on_falling_edge();
    }

    /// Returns `true` on the tick that confirms a trigger.
    pub fn poll_tick(&mut self) -> bool {
        self.input.poll_tick()
    }
}
