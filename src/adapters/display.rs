//! In-memory 16x2 character display.
//!
//! Stands in for the I²C LCD backpack: keeps the character grid, cursor
//! and backlight state so the rendered screen can be inspected.  Text past
//! the end of a line is dropped, as on the real module.

use crate::app::ports::DisplayPort;

pub const LCD_COLS: usize = 16;
pub const LCD_ROWS: usize = 2;

#[derive(Debug, Clone)]
pub struct LcdBuffer {
    cells: [[char; LCD_COLS]; LCD_ROWS],
    col: usize,
    row: usize,
    backlight: bool,
}

impl Default for LcdBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdBuffer {
    pub fn new() -> Self {
        Self {
            cells: [[' '; LCD_COLS]; LCD_ROWS],
            col: 0,
            row: 0,
            backlight: false,
        }
    }

    /// One display line with trailing blanks removed.
    pub fn line(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|cells| cells.iter().collect::<String>().trim_end().to_owned())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> [String; LCD_ROWS] {
        [self.line(0), self.line(1)]
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }
}

impl DisplayPort for LcdBuffer {
    fn clear(&mut self) {
        self.cells = [[' '; LCD_COLS]; LCD_ROWS];
        self.col = 0;
        self.row = 0;
    }

    fn print(&mut self, text: &str) {
        for c in text.chars() {
            if self.col >= LCD_COLS {
                break;
            }
            self.cells[self.row][self.col] = c;
            self.col += 1;
        }
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.col = usize::from(col).min(LCD_COLS);
        self.row = usize::from(row).min(LCD_ROWS - 1);
    }

    fn backlight_on(&mut self) {
        self.backlight = true;
    }

    fn backlight_off(&mut self) {
        self.backlight = false;
    }
}
