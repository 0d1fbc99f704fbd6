//! Passcode provisioning, arming, disarming and the incorrect-code notice,
//! driven through the physical keypad matrix.

use keyguard::app::events::AppEvent;
use keyguard::config::{AlarmConfig, SymbolPolicy};
use keyguard::fsm::Mode;

use crate::mock_hw::Harness;

#[test]
fn boots_into_passcode_setup() {
    let h = Harness::new(AlarmConfig::default());
    assert_eq!(h.mode(), Mode::SettingPasscode);
    assert_eq!(h.keypad.lines(), ["Set Passcode:".to_owned(), String::new()]);
    assert!(h.keypad.state().lcd.backlight());
    assert!(h.sink.contains(&AppEvent::Started(Mode::SettingPasscode)));
}

#[test]
fn every_key_on_the_matrix_resolves() {
    let h = Harness::new(AlarmConfig::default());
    h.type_str("12");
    assert_eq!(h.keypad.lines()[1], "**");
    h.tap('B');
    h.tap('D');
    assert_eq!(h.system.with(|svc, _| svc.entry_len()), 2);
    h.type_str("90");
    assert_eq!(h.mode(), Mode::Unarmed);
}

#[test]
fn provisioning_then_arm_and_disarm() {
    let h = Harness::new(AlarmConfig::default());

    h.type_str("123");
    assert_eq!(h.keypad.lines()[1], "***");
    h.tap('4');
    assert_eq!(h.mode(), Mode::Unarmed);
    assert_eq!(h.keypad.lines()[0], "Unarmed");

    h.tap('A');
    assert_eq!(h.keypad.lines(), ["Enter Passcode:".to_owned(), String::new()]);
    h.type_str("1234");
    assert_eq!(h.mode(), Mode::Armed);
    assert_eq!(h.keypad.lines()[0], "Armed");
    assert!(h.keypad.state().trigger_enabled);

    h.type_str("A1234");
    assert_eq!(h.mode(), Mode::Unarmed);
    assert!(!h.keypad.state().trigger_enabled);

    assert!(h.sink.contains(&AppEvent::ModeChanged {
        from: Mode::SettingPasscode,
        to: Mode::Unarmed,
    }));
    assert!(h.sink.contains(&AppEvent::ModeChanged {
        from: Mode::Armed,
        to: Mode::Unarmed,
    }));
}

#[test]
fn digits_without_a_are_ignored_once_provisioned() {
    let h = Harness::new(AlarmConfig::default());
    h.type_str("1234");
    h.type_str("1234");
    assert_eq!(h.mode(), Mode::Unarmed);
    assert_eq!(h.keypad.lines()[0], "Unarmed");
}

#[test]
fn wrong_code_shows_notice_then_restores_caption() {
    let h = Harness::new(AlarmConfig::default());
    h.type_str("1234");
    h.type_str("A9999");

    assert_eq!(h.mode(), Mode::Unarmed);
    assert_eq!(h.keypad.lines(), ["Incorrect".to_owned(), "Passcode".to_owned()]);
    assert!(h.sink.contains(&AppEvent::PasscodeRejected(Mode::Unarmed)));

    h.run_ms(1_000);
    assert_eq!(h.keypad.lines()[0], "Incorrect");
    h.run_ms(1_100);
    assert_eq!(h.keypad.lines(), ["Unarmed".to_owned(), String::new()]);
}

#[test]
fn key_press_dismisses_notice() {
    let h = Harness::new(AlarmConfig::default());
    h.type_str("1234");
    h.type_str("A0000");
    assert!(h.system.with(|svc, _| svc.notice_showing()));

    h.tap('A');
    assert!(!h.system.with(|svc, _| svc.notice_showing()));
    assert_eq!(h.keypad.lines()[0], "Enter Passcode:");
}

#[test]
fn ack_led_pulses_per_key() {
    let h = Harness::new(AlarmConfig::default());
    h.tap('7');
    assert!(h.keypad.state().ack_led);
    h.run_ms(260);
    assert!(!h.keypad.state().ack_led);
}

#[test]
fn symbols_are_discarded_by_default() {
    let h = Harness::new(AlarmConfig::default());
    h.type_str("1*2#");
    assert_eq!(h.system.with(|svc, _| svc.entry_len()), 2);
    assert_eq!(h.keypad.lines()[1], "**");
    let accepted = h
        .sink
        .events()
        .iter()
        .filter(|e| **e == AppEvent::KeyAccepted)
        .count();
    assert_eq!(accepted, 2);
}

#[test]
fn symbols_count_when_configured() {
    let config = AlarmConfig {
        symbol_policy: SymbolPolicy::PasscodeCharacter,
        ..AlarmConfig::default()
    };
    let h = Harness::new(config);
    h.type_str("1*2#");
    assert_eq!(h.mode(), Mode::Unarmed);

    h.type_str("A1*2#");
    assert_eq!(h.mode(), Mode::Armed);
}
