//! Function-pointer mode machine engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                      │
//! │  ┌─────────────────┬──────────┬─────────┬──────────────────────┐ │
//! │  │ Mode            │ on_enter │ on_exit │ entry rule           │ │
//! │  ├─────────────────┼──────────┼─────────┼──────────────────────┤ │
//! │  │ SettingPasscode │ fn(ctx)  │         │ Provision → Unarmed  │ │
//! │  │ Unarmed         │ fn(ctx)  │         │ Verify  ✓Armed ✗self │ │
//! │  │ Armed           │ fn(ctx)  │ fn(ctx) │ Verify  ✓Unarmed     │ │
//! │  │ Triggered       │ fn(ctx)  │ fn(ctx) │ Verify  ✓Unarmed     │ │
//! │  └─────────────────┴──────────┴─────────┴──────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are fed through [`Fsm::handle_key`], which runs the single passcode
//! entry routine parameterized by the current row's [`EntryRule`].  Sensor
//! trips go through [`Fsm::trip`].  Every transition runs `on_exit` for the
//! current mode, drops any in-flight entry, then runs `on_enter` for the next.

pub mod context;
pub mod states;

use context::ModeContext;
use log::{info, warn};

use crate::drivers::keypad::Key;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Operating mode of the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    SettingPasscode = 0,
    Unarmed = 1,
    Armed = 2,
    Triggered = 3,
}

impl Mode {
    /// Total number of modes: used to size the table array.
    pub const COUNT: usize = 4;

    /// Idle caption shown on the first display line.
    pub fn caption(self) -> &'static str {
        match self {
            Self::SettingPasscode => "Set Passcode",
            Self::Unarmed => "Unarmed",
            Self::Armed => "Armed",
            Self::Triggered => "Triggered",
        }
    }
}

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut ModeContext);

/// What a completed four-character entry does in a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRule {
    /// Digits store the passcode directly; the fourth moves to `next`.
    Provision { next: Mode },
    /// 'A' starts an entry; the fourth character is compared.
    Verify { success: Mode, failure: Mode },
}

/// Static descriptor for a single mode.
pub struct StateDescriptor {
    pub id: Mode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub entry: EntryRule,
}

/// Result of feeding one key to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key means nothing in the current mode.
    Ignored,
    /// An entry was started with 'A'.
    EntryStarted,
    /// A passcode character was taken; `filled` characters are in.
    Digit { filled: usize },
    /// The fourth provisioning character stored the passcode.
    Provisioned,
    /// The passcode matched.
    Accepted { from: Mode, to: Mode },
    /// The passcode did not match; the mode did not change.
    Rejected { mode: Mode },
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The mode machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `Mode as usize`.
    table: [StateDescriptor; Mode::COUNT],
    /// Index of the currently active mode.
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; Mode::COUNT], initial: Mode) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter`.  Call once after construction.
    pub fn start(&mut self, ctx: &mut ModeContext) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.table[self.current].id
    }

    /// Whether the current mode expects passcode characters right now.
    pub fn entry_in_progress(&self, ctx: &ModeContext) -> bool {
        match self.table[self.current].entry {
            EntryRule::Provision { .. } => true,
            EntryRule::Verify { .. } => ctx.entering,
        }
    }

    /// Feed one logical key through the passcode entry protocol.
    pub fn handle_key(&mut self, key: Key, ctx: &mut ModeContext) -> KeyOutcome {
        let rule = self.table[self.current].entry;
        match key {
            Key::Letter('A') => match rule {
                EntryRule::Verify { .. } if !ctx.entering => {
                    ctx.cancel_entry();
                    ctx.entering = true;
                    KeyOutcome::EntryStarted
                }
                _ => KeyOutcome::Ignored,
            },
            Key::Letter(_) => KeyOutcome::Ignored,
            Key::Digit(c) | Key::Symbol(c) => {
                if matches!(rule, EntryRule::Verify { .. }) && !ctx.entering {
                    return KeyOutcome::Ignored;
                }
                match ctx.entry.push(c) {
                    Ok(false) => KeyOutcome::Digit {
                        filled: ctx.entry.len(),
                    },
                    Ok(true) => self.complete_entry(rule, ctx),
                    Err(e) => {
                        warn!("FSM: passcode character dropped: {e}");
                        KeyOutcome::Ignored
                    }
                }
            }
        }
    }

    /// A sensor detected an intrusion.  Only Armed trips; returns whether
    /// the mode changed.
    pub fn trip(&mut self, ctx: &mut ModeContext) -> bool {
        if self.current_mode() != Mode::Armed {
            return false;
        }
        self.transition(Mode::Triggered, ctx);
        true
    }

    /// Force an immediate transition, bypassing the entry protocol.
    pub fn force_transition(&mut self, next: Mode, ctx: &mut ModeContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn complete_entry(&mut self, rule: EntryRule, ctx: &mut ModeContext) -> KeyOutcome {
        let typed = ctx.entry.complete();
        ctx.cancel_entry();
        match rule {
            EntryRule::Provision { next } => {
                ctx.stored = typed;
                info!("FSM: passcode stored");
                self.transition(next, ctx);
                KeyOutcome::Provisioned
            }
            EntryRule::Verify { success, failure } => {
                let from = self.current_mode();
                if typed.is_some() && typed == ctx.stored {
                    self.force_transition(success, ctx);
                    KeyOutcome::Accepted { from, to: success }
                } else {
                    self.force_transition(failure, ctx);
                    KeyOutcome::Rejected {
                        mode: self.current_mode(),
                    }
                }
            }
        }
    }

    fn transition(&mut self, next: Mode, ctx: &mut ModeContext) {
        let next_idx = next as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        ctx.cancel_entry();

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
