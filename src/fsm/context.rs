//! Shared mutable context threaded through every mode handler.
//!
//! `ModeContext` holds both passcodes, the entry-in-progress flag and the
//! output commands the mode hooks write.  The alarm service applies the
//! commands to the hardware after every event.

use heapless::Vec;

use crate::error::PasscodeError;

/// Number of characters in a passcode.
pub const PASSCODE_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Passcodes
// ---------------------------------------------------------------------------

/// A complete passcode.  Compared by plain equality.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Passcode([char; PASSCODE_LEN]);

impl Passcode {
    /// Build a passcode from its characters.
    pub fn new(chars: [char; PASSCODE_LEN]) -> Result<Self, PasscodeError> {
        if let Some(&bad) = chars.iter().find(|c| !is_passcode_char(**c)) {
            return Err(PasscodeError::InvalidCharacter(bad));
        }
        Ok(Self(chars))
    }
}

// Never print the characters.
impl core::fmt::Debug for Passcode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Passcode(****)")
    }
}

/// Characters a passcode may contain.
pub fn is_passcode_char(c: char) -> bool {
    c.is_ascii_digit() || c == '*' || c == '#'
}

/// The in-progress entry, filled left to right.
#[derive(Debug, Clone, Default)]
pub struct PasscodeBuffer {
    chars: Vec<char, PASSCODE_LEN>,
}

impl PasscodeBuffer {
    pub const fn new() -> Self {
        Self { chars: Vec::new() }
    }

    /// Append one character.  Returns `Ok(true)` when the buffer is now full.
    pub fn push(&mut self, c: char) -> Result<bool, PasscodeError> {
        if !is_passcode_char(c) {
            return Err(PasscodeError::InvalidCharacter(c));
        }
        self.chars.push(c).map_err(|_| PasscodeError::BufferFull)?;
        Ok(self.chars.is_full())
    }

    /// The completed passcode, once all characters are in.
    pub fn complete(&self) -> Option<Passcode> {
        let chars: [char; PASSCODE_LEN] = self.chars.as_slice().try_into().ok()?;
        Passcode::new(chars).ok()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output commands (written by mode hooks; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCommands {
    /// Audible alarm.
    pub buzzer: bool,
    /// Visual alarm indicator.
    pub alarm_led: bool,
    /// Intrusion sensors are sampled (digital trigger enabled, ranger pulsing).
    pub sensors_enabled: bool,
}

impl OutputCommands {
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// ModeContext
// ---------------------------------------------------------------------------

/// The shared context passed to every mode hook.
#[derive(Debug, Default)]
pub struct ModeContext {
    /// Set once, at the end of provisioning.
    pub stored: Option<Passcode>,
    /// Characters typed so far.
    pub entry: PasscodeBuffer,
    /// A verification entry was started with 'A'.
    pub entering: bool,
    pub outputs: OutputCommands,
}

impl ModeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partially typed passcode.
    pub fn cancel_entry(&mut self) {
        self.entry.clear();
        self.entering = false;
    }

    /// The alarm is sounding.
    pub fn alarm_active(&self) -> bool {
        self.outputs.buzzer
    }
}
