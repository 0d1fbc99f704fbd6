//! Two-tick edge debouncer shared by the keypad columns and the trigger sensor.
//!
//! ## Protocol
//!
//! | Input            | Effect                                           |
//! |------------------|--------------------------------------------------|
//! | rising edge      | `raw` set                                        |
//! | falling edge     | `raw`, `buffered` and `confirmed` all cleared    |
//! | poll tick, raw   | first tick buffers, second tick confirms (once)  |
//! | poll tick, !raw  | buffer cleared                                   |
//!
//! A press is confirmed only after two consecutive poll ticks saw the line
//! high, which rejects contact bounce shorter than one poll period.  The
//! input re-arms on the next falling edge.

/// A debounced digital input driven by edge notifications and a poll tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebouncedInput {
    raw: bool,
    buffered: bool,
    confirmed: bool,
}

impl DebouncedInput {
    pub const fn new() -> Self {
        Self {
            raw: false,
            buffered: false,
            confirmed: false,
        }
    }

    pub fn on_rising_edge(&mut self) {
        self.raw = true;
    }

    pub fn on_falling_edge(&mut self) {
        self.raw = false;
        self.buffered = false;
        self.confirmed = false;
    }

    /// Run one poll period.  Returns `true` on the single tick that confirms
    /// the current press.
    pub fn poll_tick(&mut self) -> bool {
        if !self.raw {
            self.buffered = false;
            return false;
        }
        if !self.buffered {
            self.buffered = true;
            return false;
        }
        if self.confirmed {
            return false;
        }
        self.confirmed = true;
        true
    }

    /// Confirmed (debounced) press state.
    pub fn is_pressed(&self) -> bool {
        self.confirmed
    }

    /// Raw line state as last reported by an edge.
    pub fn is_raw_high(&self) -> bool {
        self.raw
    }
}
