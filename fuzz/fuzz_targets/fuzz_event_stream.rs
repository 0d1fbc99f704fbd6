//! Fuzz target: arbitrary input streams into `AlarmService`
//!
//! Each input byte selects an edge, a tick, a key held on the matrix, or a
//! clock advance.  After every step the mode outputs must agree with the mode.
//!
//! cargo fuzz run fuzz_event_stream

#![no_main]

use embassy_time::{Duration, Instant};
use keyguard::app::events::AppEvent;
use keyguard::app::ports::{AlarmOutputs, DisplayPort, EventSink, KeypadLines, RangerPort};
use keyguard::app::service::AlarmService;
use keyguard::config::AlarmConfig;
use keyguard::fsm::Mode;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Board {
    row: usize,
    held: Option<(usize, usize)>,
}

impl KeypadLines for Board {
    fn select_row(&mut self, row: usize) {
        self.row = row;
    }
    fn column_active(&mut self, col: usize) -> bool {
        self.held == Some((self.row, col))
    }
}

impl AlarmOutputs for Board {
    fn set_buzzer(&mut self, _on: bool) {}
    fn set_alarm_led(&mut self, _on: bool) {}
    fn set_ack_led(&mut self, _on: bool) {}
    fn set_trigger_sensor_enabled(&mut self, _enabled: bool) {}
}

impl RangerPort for Board {
    fn pulse_trigger(&mut self, _width: Duration) {}
}

impl DisplayPort for Board {
    fn clear(&mut self) {}
    fn print(&mut self, _text: &str) {}
    fn set_cursor(&mut self, _col: u8, _row: u8) {}
    fn backlight_on(&mut self) {}
    fn backlight_off(&mut self) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut svc = AlarmService::new(AlarmConfig::default());
    let mut board = Board::default();
    let mut sink = Discard;
    let mut now = Instant::from_ticks(0);
    svc.start(&mut board, &mut sink, now);

    for &b in data {
        match b >> 5 {
            0 => svc.on_column_edge(b & 1 == 1),
            1 => svc.on_trigger_edge(b & 1 == 1),
            2 => svc.on_echo_edge(b & 1 == 1, &mut board, &mut sink, now),
            3 => svc.debounce_tick(&mut board, &mut sink, now),
            4 => svc.range_tick(&mut board),
            5 => svc.echo_timeout(&mut board, &mut sink, now),
            6 => {
                board.held = (b & 0x10 != 0).then_some((usize::from(b >> 2) & 3, usize::from(b) & 3));
                svc.advance_row(&mut board);
            }
            _ => now += Duration::from_micros(u64::from(b & 0x1f) * 100),
        }

        assert!(svc.entry_len() < 4);
        assert_eq!(svc.alarm_active(), svc.mode() == Mode::Triggered);
        assert_eq!(svc.sensors_enabled(), svc.mode() == Mode::Armed);
        assert!(svc.current_row() < 4);
    }
});
