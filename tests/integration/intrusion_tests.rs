//! Digital trigger and ultrasonic intrusion paths, alarm outputs and
//! disarming from Triggered.

use embassy_time::Duration;
use keyguard::app::events::{AppEvent, IntrusionSource};
use keyguard::config::AlarmConfig;
use keyguard::events::Event;
use keyguard::fsm::Mode;

use crate::mock_hw::Harness;

fn trip_trigger(h: &Harness) {
    h.inject(Event::TriggerRise);
    h.run_ms(3);
}

#[test]
fn trigger_trips_armed_system() {
    let h = Harness::armed_1234(AlarmConfig::default());
    trip_trigger(&h);

    assert_eq!(h.mode(), Mode::Triggered);
    let board = h.keypad.state();
    assert!(board.buzzer);
    assert!(board.alarm_led);
    assert!(!board.trigger_enabled);
    assert_eq!(board.lcd.line(0), "Triggered");
    drop(board);
    assert!(h.sink.contains(&AppEvent::Intrusion(IntrusionSource::DigitalTrigger)));
}

#[test]
fn trigger_is_ignored_when_unarmed() {
    let h = Harness::new(AlarmConfig::default());
    h.type_str("1234");
    trip_trigger(&h);
    assert_eq!(h.mode(), Mode::Unarmed);
    assert!(!h.keypad.state().buzzer);
}

#[test]
fn trigger_glitch_shorter_than_debounce_is_ignored() {
    let h = Harness::armed_1234(AlarmConfig::default());
    h.inject(Event::TriggerRise);
    h.step();
    h.inject(Event::TriggerFall);
    h.run_ms(5);
    assert_eq!(h.mode(), Mode::Armed);
}

#[test]
fn long_echo_trips_on_debounce_tick() {
    let h = Harness::armed_1234(AlarmConfig::default());
    h.inject(Event::RangeTick);
    assert_eq!(h.keypad.state().pulses, 1);

    h.inject(Event::EchoRise(h.now()));
    assert_eq!(h.mode(), Mode::Armed);
    h.step();
    assert_eq!(h.mode(), Mode::Triggered);
    assert!(h.sink.contains(&AppEvent::Intrusion(IntrusionSource::Ultrasonic)));
}

#[test]
fn long_echo_trips_on_timeout_event() {
    let h = Harness::armed_1234(AlarmConfig::default());
    h.inject(Event::EchoRise(h.now()));
    h.system.clock().advance(Duration::from_micros(900));
    h.inject(Event::EchoTimeout(h.now()));
    assert_eq!(h.mode(), Mode::Triggered);
}

#[test]
fn early_timeout_event_does_not_trip() {
    let h = Harness::armed_1234(AlarmConfig::default());
    h.inject(Event::EchoRise(h.now()));
    h.system.clock().advance(Duration::from_micros(400));
    h.inject(Event::EchoTimeout(h.now()));
    assert_eq!(h.mode(), Mode::Armed);
}

#[test]
fn short_echo_is_out_of_range() {
    let h = Harness::armed_1234(AlarmConfig::default());
    h.inject(Event::EchoRise(h.now()));
    h.system.clock().advance(Duration::from_micros(500));
    h.inject(Event::EchoFall(h.now()));
    h.run_ms(5);
    assert_eq!(h.mode(), Mode::Armed);
}

#[test]
fn short_echo_dispatched_late_is_out_of_range() {
    let h = Harness::armed_1234(AlarmConfig::default());
    let rise = h.now();
    h.inject(Event::EchoRise(rise));

    // The worker falls behind: a tick and the fall are both produced inside
    // the threshold but handled a millisecond later, in queue order.
    h.system.clock().advance(Duration::from_millis(1));
    h.queue.push(Event::DebounceTick(rise + Duration::from_micros(300)));
    h.queue.push(Event::EchoFall(rise + Duration::from_micros(500)));
    h.drain();

    assert_eq!(h.mode(), Mode::Armed);
    assert!(!h.sink.contains(&AppEvent::Intrusion(IntrusionSource::Ultrasonic)));
    h.run_ms(5);
    assert_eq!(h.mode(), Mode::Armed);
}

#[test]
fn long_echo_with_no_tick_between_edges_trips_on_fall() {
    let h = Harness::armed_1234(AlarmConfig::default());
    let rise = h.now();
    h.queue.push(Event::EchoRise(rise));
    h.queue.push(Event::EchoFall(rise + Duration::from_micros(1_200)));
    h.drain();
    assert_eq!(h.mode(), Mode::Triggered);
    assert!(h.sink.contains(&AppEvent::Intrusion(IntrusionSource::Ultrasonic)));
}

#[test]
fn ranger_only_pulses_while_armed_and_idle() {
    let h = Harness::new(AlarmConfig::default());
    h.type_str("1234");
    h.inject(Event::RangeTick);
    assert_eq!(h.keypad.state().pulses, 0);

    h.type_str("A1234");
    h.inject(Event::RangeTick);
    assert_eq!(h.keypad.state().pulses, 1);

    h.inject(Event::EchoRise(h.now()));
    h.inject(Event::RangeTick);
    assert_eq!(h.keypad.state().pulses, 1);
}

#[test]
fn alarm_led_blinks_while_triggered() {
    let h = Harness::armed_1234(AlarmConfig::default());
    trip_trigger(&h);
    let before = h.keypad.state().alarm_led_toggles;

    h.inject(Event::RangeTick);
    assert!(!h.keypad.state().alarm_led);
    h.inject(Event::RangeTick);
    assert!(h.keypad.state().alarm_led);
    assert_eq!(h.keypad.state().alarm_led_toggles, before + 2);
    assert!(h.keypad.state().buzzer);
}

#[test]
fn disarm_from_triggered_silences_alarm() {
    let h = Harness::armed_1234(AlarmConfig::default());
    trip_trigger(&h);

    h.type_str("A0000");
    assert_eq!(h.mode(), Mode::Triggered);
    assert!(h.keypad.state().buzzer);

    h.type_str("A1234");
    assert_eq!(h.mode(), Mode::Unarmed);
    let board = h.keypad.state();
    assert!(!board.buzzer);
    assert!(!board.alarm_led);
    assert!(!board.trigger_enabled);
}

#[test]
fn intrusion_overrides_disarm_in_progress() {
    let h = Harness::armed_1234(AlarmConfig::default());
    h.type_str("A12");
    trip_trigger(&h);

    assert_eq!(h.mode(), Mode::Triggered);
    assert!(!h.system.with(|svc, _| svc.entering()));
    assert_eq!(h.keypad.lines()[0], "Triggered");
}

#[test]
fn intrusion_wakes_sleeping_display() {
    let config = AlarmConfig {
        idle_timeout_ms: 200,
        ..AlarmConfig::default()
    };
    let h = Harness::armed_1234(config);
    h.run_ms(250);
    assert!(!h.keypad.state().lcd.backlight());

    trip_trigger(&h);
    assert!(h.keypad.state().lcd.backlight());
    assert!(h.sink.contains(&AppEvent::DisplayWake));
}
