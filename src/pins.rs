//! GPIO / peripheral pin assignments for the Keyguard main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// 4x4 matrix keypad
// ---------------------------------------------------------------------------

/// Row-select outputs, row 0 first.  Exactly one is driven high at a time.
pub const KEYPAD_ROW_GPIOS: [i32; 4] = [4, 5, 6, 7];
/// Column-sense inputs (pull-down, both edges), column 0 first.
pub const KEYPAD_COL_GPIOS: [i32; 4] = [15, 16, 17, 18];

// ---------------------------------------------------------------------------
// Trigger sensors
// ---------------------------------------------------------------------------

/// Digital trigger sensor (microphone / PIR module) output, pull-down.
pub const TRIGGER_SENSOR_GPIO: i32 = 8;
/// Enable line for the digital trigger sensor (HIGH = listening).
pub const TRIGGER_ENABLE_GPIO: i32 = 9;

/// HC-SR04 trigger input.
pub const RANGER_TRIGGER_GPIO: i32 = 10;
/// HC-SR04 echo output, pull-down, both edges.
pub const RANGER_ECHO_GPIO: i32 = 11;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Active buzzer (HIGH = sounding).
pub const BUZZER_GPIO: i32 = 12;
/// Visual alarm LED bank.
pub const ALARM_LED_GPIO: i32 = 13;
/// "Key accepted" LED.
pub const ACK_LED_GPIO: i32 = 14;

/// Every output pin, in configuration order.
pub const OUTPUT_GPIOS: [i32; 9] = [
    KEYPAD_ROW_GPIOS[0],
    KEYPAD_ROW_GPIOS[1],
    KEYPAD_ROW_GPIOS[2],
    KEYPAD_ROW_GPIOS[3],
    TRIGGER_ENABLE_GPIO,
    RANGER_TRIGGER_GPIO,
    BUZZER_GPIO,
    ALARM_LED_GPIO,
    ACK_LED_GPIO,
];
