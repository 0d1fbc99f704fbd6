//! What the 16x2 display shows.
//!
//! The screen is derived from the mode, the entry progress and whether the
//! incorrect-passcode notice is up; it is redrawn whole rather than patched.

use crate::fsm::Mode;

use super::ports::DisplayPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Mode caption only.
    Idle(Mode),
    /// Prompt plus one `*` per typed character.
    Entry { mode: Mode, filled: usize },
    /// "Incorrect Passcode", held for the notice period.
    Notice,
}

impl Screen {
    pub fn lines(self) -> (&'static str, usize) {
        match self {
            Self::Idle(mode) => (mode.caption(), 0),
            Self::Entry {
                mode: Mode::SettingPasscode,
                filled,
            } => ("Set Passcode:", filled),
            Self::Entry { filled, .. } => ("Enter Passcode:", filled),
            Self::Notice => ("Incorrect", 0),
        }
    }

    /// Clear and draw the whole screen.
    pub fn render(self, display: &mut impl DisplayPort) {
        display.clear();
        let (top, filled) = self.lines();
        display.print(top);
        display.set_cursor(0, 1);
        if self == Self::Notice {
            display.print("Passcode");
            return;
        }
        for _ in 0..filled {
            display.print("*");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl DisplayPort for Recorder {
        fn clear(&mut self) {
            self.ops.push("clear".into());
        }
        fn print(&mut self, text: &str) {
            self.ops.push(format!("print {text}"));
        }
        fn set_cursor(&mut self, col: u8, row: u8) {
            self.ops.push(format!("cursor {col},{row}"));
        }
        fn backlight_on(&mut self) {}
        fn backlight_off(&mut self) {}
    }

    #[test]
    fn idle_shows_caption() {
        let mut d = Recorder::default();
        Screen::Idle(Mode::Armed).render(&mut d);
        assert_eq!(d.ops, ["clear", "print Armed", "cursor 0,1"]);
    }

    #[test]
    fn entry_masks_characters() {
        let mut d = Recorder::default();
        Screen::Entry {
            mode: Mode::Unarmed,
            filled: 2,
        }
        .render(&mut d);
        assert_eq!(
            d.ops,
            ["clear", "print Enter Passcode:", "cursor 0,1", "print *", "print *"]
        );
    }

    #[test]
    fn notice_spans_both_lines() {
        let mut d = Recorder::default();
        Screen::Notice.render(&mut d);
        assert_eq!(
            d.ops,
            ["clear", "print Incorrect", "cursor 0,1", "print Passcode"]
        );
    }
}
