//! System configuration parameters
//!
//! All tunable timing parameters for the Keyguard alarm.
//! Defaults match the reference wiring; the firmware can override them with
//! a JSON document embedded at build time.  Nothing here is persisted.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the keypad's `*` and `#` keys are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPolicy {
    /// The scanner drops `*` and `#`; they never reach the mode machine.
    #[default]
    Discard,
    /// `*` and `#` are delivered and count as passcode characters in every mode.
    PasscodeCharacter,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    // --- Keypad ---
    /// Debounce poll period (milliseconds)
    pub debounce_poll_ms: u32,
    /// Row driver period (milliseconds); the watchdog is kicked once per scan
    pub row_scan_interval_ms: u32,
    /// Treatment of the `*` / `#` keys
    pub symbol_policy: SymbolPolicy,

    // --- Ultrasonic ranging ---
    /// Trigger pulse period (milliseconds)
    pub range_period_ms: u32,
    /// Trigger pulse width (microseconds)
    pub trigger_pulse_us: u32,
    /// Echo duration that classifies an object as in range (microseconds)
    pub echo_threshold_us: u32,

    // --- Display / UI ---
    /// Inactivity before the display powers off (milliseconds)
    pub idle_timeout_ms: u32,
    /// How long the "Incorrect Passcode" notice stays up (milliseconds)
    pub notice_hold_ms: u32,
    /// Width of the key-accepted indicator pulse (milliseconds)
    pub key_ack_pulse_ms: u32,

    // --- Supervision ---
    /// Hardware watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            // Keypad
            debounce_poll_ms: 1,
            row_scan_interval_ms: 1,
            symbol_policy: SymbolPolicy::Discard,

            // Ultrasonic
            range_period_ms: 500,
            trigger_pulse_us: 10,
            echo_threshold_us: 888, // ~15 cm round trip

            // Display
            idle_timeout_ms: 10_000,
            notice_hold_ms: 2_000,
            key_ack_pulse_ms: 250,

            // Supervision
            watchdog_timeout_ms: 5_000,
        }
    }
}

impl AlarmConfig {
    /// Parse a (possibly partial) JSON override.  Missing fields keep their
    /// defaults.  The result is validated before it is returned.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the loop or make timers meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("debounce_poll_ms must be > 0"));
        }
        if self.row_scan_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("row_scan_interval_ms must be > 0"));
        }
        if self.range_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("range_period_ms must be > 0"));
        }
        if self.trigger_pulse_us == 0 {
            return Err(ConfigError::ValidationFailed("trigger_pulse_us must be > 0"));
        }
        if self.echo_threshold_us == 0 {
            return Err(ConfigError::ValidationFailed("echo_threshold_us must be > 0"));
        }
        if self.row_scan_interval_ms.saturating_mul(10) >= self.watchdog_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "row_scan_interval_ms must be well below watchdog_timeout_ms",
            ));
        }
        if self.key_ack_pulse_ms > self.idle_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "key_ack_pulse_ms must not exceed idle_timeout_ms",
            ));
        }
        Ok(())
    }

    pub fn debounce_poll(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_poll_ms))
    }

    pub fn row_scan_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.row_scan_interval_ms))
    }

    pub fn range_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.range_period_ms))
    }

    pub fn trigger_pulse(&self) -> Duration {
        Duration::from_micros(u64::from(self.trigger_pulse_us))
    }

    pub fn echo_threshold(&self) -> Duration {
        Duration::from_micros(u64::from(self.echo_threshold_us))
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.idle_timeout_ms))
    }

    pub fn notice_hold(&self) -> Duration {
        Duration::from_millis(u64::from(self.notice_hold_ms))
    }

    pub fn key_ack_pulse(&self) -> Duration {
        Duration::from_millis(u64::from(self.key_ack_pulse_ms))
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.watchdog_timeout_ms))
    }
}
