//! Backlight idle timeout and wake-on-key.

use keyguard::app::events::AppEvent;
use keyguard::config::AlarmConfig;
use keyguard::fsm::Mode;

use crate::mock_hw::Harness;

fn quick_idle() -> AlarmConfig {
    AlarmConfig {
        idle_timeout_ms: 500,
        ..AlarmConfig::default()
    }
}

#[test]
fn display_sleeps_after_idle_timeout() {
    let h = Harness::new(quick_idle());
    h.run_ms(490);
    assert!(h.keypad.state().lcd.backlight());
    h.run_ms(20);
    assert!(!h.keypad.state().lcd.backlight());
    assert!(h.sink.contains(&AppEvent::DisplaySleep));
}

#[test]
fn key_press_wakes_and_restarts_timeout() {
    let h = Harness::new(quick_idle());
    h.run_ms(600);
    assert!(!h.system.with(|svc, _| svc.display_on()));

    h.tap('5');
    assert!(h.keypad.state().lcd.backlight());
    assert!(h.sink.contains(&AppEvent::DisplayWake));

    h.run_ms(400);
    assert!(h.keypad.state().lcd.backlight());
}

#[test]
fn discarded_symbol_press_wakes_display() {
    let h = Harness::new(quick_idle());
    h.run_ms(600);
    assert!(!h.system.with(|svc, _| svc.display_on()));

    h.tap('*');
    assert!(h.system.with(|svc, _| svc.display_on()));
    assert!(h.keypad.state().lcd.backlight());
    assert!(h.sink.contains(&AppEvent::DisplayWake));
    assert_eq!(h.system.with(|svc, _| svc.entry_len()), 0);
    assert_eq!(h.keypad.lines()[0], "Set Passcode:");

    h.run_ms(400);
    assert!(h.keypad.state().lcd.backlight());
}

#[test]
fn discarded_symbol_press_pulses_ack_led() {
    let h = Harness::new(AlarmConfig::default());
    h.keypad.press('#');
    for _ in 0..20 {
        h.step();
        if h.system.with(|svc, _| svc.key_pressed()) {
            break;
        }
    }
    assert!(h.keypad.state().ack_led);
    h.keypad.release();
    h.run_ms(260);
    assert!(!h.keypad.state().ack_led);
}

#[test]
fn sleeping_abandons_partial_provisioning() {
    let h = Harness::new(quick_idle());
    h.type_str("12");
    h.run_ms(600);
    assert_eq!(h.system.with(|svc, _| svc.entry_len()), 0);

    h.type_str("9876");
    assert_eq!(h.mode(), Mode::Unarmed);
    h.type_str("A9876");
    assert_eq!(h.mode(), Mode::Armed);
}

#[test]
fn sleeping_abandons_partial_disarm() {
    let h = Harness::armed_1234(quick_idle());
    h.type_str("A12");
    h.run_ms(600);
    assert!(!h.system.with(|svc, _| svc.entering()));
    assert_eq!(h.keypad.lines()[0], "Armed");

    // Without a fresh 'A' the digits are ignored.
    h.type_str("34");
    assert_eq!(h.mode(), Mode::Armed);
}

#[test]
fn each_key_keeps_display_awake() {
    let h = Harness::new(quick_idle());
    for key in "1234".chars() {
        h.run_ms(300);
        h.tap(key);
    }
    assert!(h.keypad.state().lcd.backlight());
    assert!(!h.sink.contains(&AppEvent::DisplaySleep));
}
