//! Outbound application events.
//!
//! The [`AlarmService`](super::service::AlarmService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  None of them carries a
//! passcode character.

use crate::fsm::Mode;

/// Which sensor reported an intrusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrusionSource {
    DigitalTrigger,
    Ultrasonic,
}

/// Structured events emitted by the alarm core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial mode).
    Started(Mode),

    /// The mode machine changed mode.
    ModeChanged { from: Mode, to: Mode },

    /// A key was resolved and delivered to the mode machine.
    KeyAccepted,

    /// 'A' started a passcode entry.
    EntryStarted(Mode),

    /// A completed entry did not match.
    PasscodeRejected(Mode),

    /// An armed sensor tripped the alarm.
    Intrusion(IntrusionSource),

    /// The idle timeout powered the display off.
    DisplaySleep,

    /// Input powered the display back on.
    DisplayWake,
}
