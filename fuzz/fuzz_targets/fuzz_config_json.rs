//! Fuzz target: `AlarmConfig::from_json`
//!
//! Arbitrary bytes must never panic the parser, and anything it accepts
//! must pass validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use keyguard::config::AlarmConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = AlarmConfig::from_json(doc) {
        assert_eq!(config.validate(), Ok(()));
    }
});
