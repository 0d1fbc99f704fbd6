//! Concrete mode hooks and table builder.
//!
//! Each mode is a row of plain `fn` pointers plus the passcode rule it
//! applies.  The entry protocol itself lives once in the engine; modes only
//! differ in where a completed entry leads.
//!
//! ```text
//!  SETTING_PASSCODE ──[4 chars]──▶ UNARMED ◀──────────────┐
//!                                   │    ▲                │
//!                        [A + code] │    │ [A + code]     │ [A + code]
//!                                   ▼    │                │
//!                                  ARMED ──[sensor]──▶ TRIGGERED
//!
//!  Wrong code: stay in the same mode, entry cleared.
//! ```

use log::{info, warn};

use super::context::ModeContext;
use super::{EntryRule, Mode, StateDescriptor};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; Mode::COUNT] {
    [
        // Index 0: SettingPasscode
        StateDescriptor {
            id: Mode::SettingPasscode,
            name: "SettingPasscode",
            on_enter: Some(setting_enter),
            on_exit: None,
            entry: EntryRule::Provision {
                next: Mode::Unarmed,
            },
        },
        // Index 1: Unarmed
        StateDescriptor {
            id: Mode::Unarmed,
            name: "Unarmed",
            on_enter: Some(quiet_enter),
            on_exit: None,
            entry: EntryRule::Verify {
                success: Mode::Armed,
                failure: Mode::Unarmed,
            },
        },
        // Index 2: Armed
        StateDescriptor {
            id: Mode::Armed,
            name: "Armed",
            on_enter: Some(armed_enter),
            on_exit: Some(armed_exit),
            entry: EntryRule::Verify {
                success: Mode::Unarmed,
                failure: Mode::Armed,
            },
        },
        // Index 3: Triggered
        StateDescriptor {
            id: Mode::Triggered,
            name: "Triggered",
            on_enter: Some(triggered_enter),
            on_exit: Some(triggered_exit),
            entry: EntryRule::Verify {
                success: Mode::Unarmed,
                failure: Mode::Triggered,
            },
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  SETTING_PASSCODE
// ═══════════════════════════════════════════════════════════════════════════

fn setting_enter(ctx: &mut ModeContext) {
    ctx.outputs = super::context::OutputCommands::all_off();
    info!("SETTING_PASSCODE: waiting for a new passcode");
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNARMED
// ═══════════════════════════════════════════════════════════════════════════

fn quiet_enter(ctx: &mut ModeContext) {
    ctx.outputs.buzzer = false;
    ctx.outputs.alarm_led = false;
    ctx.outputs.sensors_enabled = false;
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED
// ═══════════════════════════════════════════════════════════════════════════

fn armed_enter(ctx: &mut ModeContext) {
    ctx.outputs.sensors_enabled = true;
    info!("ARMED: intrusion sensors enabled");
}

fn armed_exit(ctx: &mut ModeContext) {
    ctx.outputs.sensors_enabled = false;
}

// ═══════════════════════════════════════════════════════════════════════════
//  TRIGGERED
// ═══════════════════════════════════════════════════════════════════════════

fn triggered_enter(ctx: &mut ModeContext) {
    ctx.outputs.buzzer = true;
    ctx.outputs.alarm_led = true;
    warn!("TRIGGERED: alarm sounding");
}

fn triggered_exit(ctx: &mut ModeContext) {
    ctx.outputs.buzzer = false;
    ctx.outputs.alarm_led = false;
    info!("TRIGGERED: alarm silenced");
}
