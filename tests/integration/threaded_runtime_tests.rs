//! The full runtime on real threads: simulated tick timers, the key worker,
//! the row driver and its watchdog, against the simulated board.

use std::sync::Arc;
use std::time::{Duration, Instant};

use keyguard::adapters::time::SystemClock;
use keyguard::app::service::AlarmService;
use keyguard::config::AlarmConfig;
use keyguard::drivers::hw_timer;
use keyguard::drivers::watchdog::Watchdog;
use keyguard::fsm::Mode;
use keyguard::runtime::{AlarmSystem, Runtime};

use crate::mock_hw::{Keypad, MockBoard, RecordingSink, board};

type System = AlarmSystem<MockBoard, RecordingSink, SystemClock>;

fn wait_until(system: &System, what: &str, f: impl Fn(&AlarmService) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if system.with(|svc, _| f(svc)) {
            return;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("timed out waiting for {what}");
}

fn tap(system: &System, keypad: &Keypad, key: char) {
    keypad.press(key);
    wait_until(system, "press confirmed", AlarmService::key_pressed);
    keypad.release();
    wait_until(system, "release", |svc| !svc.key_pressed());
}

fn type_str(system: &System, keypad: &Keypad, keys: &str) {
    for key in keys.chars() {
        tap(system, keypad, key);
    }
}

#[test]
fn keypad_scenario_on_worker_threads() {
    let config = AlarmConfig {
        notice_hold_ms: 300,
        ..AlarmConfig::default()
    };
    let (board, keypad, queue) = board();
    let clock = SystemClock::new();
    let system = Arc::new(AlarmSystem::new(
        AlarmService::new(config.clone()),
        board,
        RecordingSink::default(),
        clock.clone(),
    ));
    system.start();

    let watchdog = Watchdog::new();
    let kicks = watchdog.stats();
    let ticker = hw_timer::start_timers(&config, Arc::clone(&queue), clock).unwrap();
    let runtime = Runtime::spawn(Arc::clone(&system), Arc::clone(&queue), watchdog).unwrap();

    type_str(&system, &keypad, "1234");
    wait_until(&system, "Unarmed", |svc| svc.mode() == Mode::Unarmed);

    type_str(&system, &keypad, "A1234");
    wait_until(&system, "Armed", |svc| svc.mode() == Mode::Armed);
    assert!(keypad.state().trigger_enabled);

    type_str(&system, &keypad, "A5555");
    assert!(system.with(|svc, _| svc.notice_showing()));
    let before = kicks.kicks();
    std::thread::sleep(Duration::from_millis(150));
    assert!(kicks.kicks() > before + 10, "row driver stalled during notice");
    assert_eq!(keypad.lines()[0], "Incorrect");
    wait_until(&system, "notice cleared", |svc| !svc.notice_showing());
    assert_eq!(keypad.lines()[0], "Armed");

    type_str(&system, &keypad, "A1234");
    wait_until(&system, "Unarmed", |svc| svc.mode() == Mode::Unarmed);

    ticker.stop();
    runtime.shutdown();
    assert!(kicks.max_gap() < Duration::from_millis(500));
}
