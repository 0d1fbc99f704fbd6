//! 4x4 matrix keypad scanner.
//!
//! ## Theory of operation
//!
//! One row line is powered at a time.  A pressed key shorts its row to its
//! column, so a column edge means "some key in the powered row".  Row
//! rotation freezes while the column line is high, which keeps the
//! (powered row, active column) pair valid until the press is confirmed and
//! resolved.  Both operations run under the shared alarm lock.
//!
//! ```text
//!            col0 col1 col2 col3
//!   row 0  [  1    2    3    A  ]
//!   row 1  [  4    5    6    B  ]
//!   row 2  [  7    8    9    C  ]
//!   row 3  [  *    0    #    D  ]
//! ```
//!
//! Ghosting is not resolved: if several columns read high, the first in
//! column order wins.

use crate::app::ports::KeypadLines;
use crate::config::SymbolPolicy;

use super::debounce::DebouncedInput;

pub const ROWS: usize = 4;
pub const COLS: usize = 4;

/// Physical legend of the keypad, indexed `[row][col]`.
pub const KEYPAD_GRID: [[char; COLS]; ROWS] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// A logical key delivered to the mode machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `0`–`9`, stored as its character.
    Digit(char),
    /// `A`–`D`.
    Letter(char),
    /// `*` or `#`; only produced under [`SymbolPolicy::PasscodeCharacter`].
    Symbol(char),
}

impl Key {
    /// Classify a keypad legend character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c)),
            'A'..='D' => Some(Self::Letter(c)),
            '*' | '#' => Some(Self::Symbol(c)),
            _ => None,
        }
    }
}

/// Row rotation plus the shared column debouncer (`ScanState`).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypadScanner {
    current_row: usize,
    columns: DebouncedInput,
}

impl KeypadScanner {
    pub const fn new() -> Self {
        Self {
            current_row: 0,
            columns: DebouncedInput::new(),
        }
    }

    /// Power the initial row.
    pub fn start(&self, lines: &mut impl KeypadLines) {
        lines.select_row(self.current_row);
    }

    pub fn current_row(&self) -> usize {
        self.current_row
    }

    /// The debounced column input (edges and poll ticks are routed here).
    pub fn columns(&self) -> &DebouncedInput {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut DebouncedInput {
        &mut self.columns
    }

    /// Rotate to the next row, unless a key is down.  Returns whether the
    /// row advanced.
    pub fn advance_row_if_idle(&mut self, lines: &mut impl KeypadLines) -> bool {
        if self.columns.is_raw_high() || self.columns.is_pressed() {
            return false;
        }
        self.current_row = (self.current_row + 1) % ROWS;
        lines.select_row(self.current_row);
        true
    }

    /// Resolve the pressed key from the live column lines and the powered row.
    ///
    /// The first active column wins.  Under [`SymbolPolicy::Discard`] a
    /// `*`/`#` hit resolves to `None`.
    pub fn resolve_key(&self, lines: &mut impl KeypadLines, policy: SymbolPolicy) -> Option<Key> {
        let col = (0..COLS).find(|&c| lines.column_active(c))?;
        let key = Key::from_char(KEYPAD_GRID[self.current_row][col])?;
        match (key, policy) {
            (Key::Symbol(_), SymbolPolicy::Discard) => None,
            _ => Some(key),
        }
    }
}
