//! Keyguard Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HalHardware        LogEventSink   SystemClock   Watchdog      │
//! │  (Keypad+Outputs+   (EventSink)    (Clock)       (TWDT)        │
//! │   Ranger+Display)                                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AlarmService (pure logic)                 │    │
//! │  │  Scanner · Mode FSM · Sensors · DisplayPower           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ISRs + esp_timer ─▶ EventQueue ─▶ key worker                  │
//! │  row driver ─▶ watchdog kick                                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use keyguard::adapters::display::LcdBuffer;
use keyguard::adapters::hardware::{AlarmPins, HalHardware};
use keyguard::adapters::log_sink::LogEventSink;
use keyguard::adapters::time::SystemClock;
use keyguard::app::service::AlarmService;
use keyguard::config::AlarmConfig;
use keyguard::drivers::hw_init::{self, GpioPin};
use keyguard::drivers::hw_timer;
use keyguard::drivers::watchdog::Watchdog;
use keyguard::error::Error;
use keyguard::events::{EVENTS, EventQueue};
use keyguard::pins;
use keyguard::runtime::{AlarmSystem, Runtime};

/// Build-time overrides; an empty object keeps every default.
const CONFIG_JSON: &str = include_str!("../config/alarm.json");

fn load_config() -> AlarmConfig {
    match AlarmConfig::from_json(CONFIG_JSON) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("embedded config rejected ({}), using defaults", e);
            AlarmConfig::default()
        }
    }
}

fn board_pins() -> AlarmPins<GpioPin, GpioPin> {
    AlarmPins {
        rows: pins::KEYPAD_ROW_GPIOS.map(GpioPin::new),
        cols: pins::KEYPAD_COL_GPIOS.map(GpioPin::new),
        trigger_enable: GpioPin::new(pins::TRIGGER_ENABLE_GPIO),
        ranger_trigger: GpioPin::new(pins::RANGER_TRIGGER_GPIO),
        buzzer: GpioPin::new(pins::BUZZER_GPIO),
        alarm_led: GpioPin::new(pins::ALARM_LED_GPIO),
        ack_led: GpioPin::new(pins::ACK_LED_GPIO),
    }
}

/// Configure the board, start the alarm core and its workers.
fn bring_up(config: &AlarmConfig) -> keyguard::error::Result<Runtime<&'static EventQueue>> {
    hw_init::init_peripherals()?;

    let hw = HalHardware::new(board_pins(), esp_idf_hal::delay::Ets, LcdBuffer::new());
    let system = Arc::new(AlarmSystem::new(
        AlarmService::new(config.clone()),
        hw,
        LogEventSink::new(),
        SystemClock::new(),
    ));
    system.start();

    hw_timer::start_timers(config)?;
    let runtime = Runtime::spawn(system, &EVENTS, Watchdog::new()).map_err(|e| {
        warn!("worker spawn failed: {}", e);
        Error::Spawn("key-worker/row-driver")
    })?;
    hw_init::init_isr_service()?;
    Ok(runtime)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Keyguard v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals, tick sources and workers ──────────────
    let config = load_config();
    let runtime = bring_up(&config).context("bring-up failed")?;

    info!("System ready.");
    runtime.join();
    Ok(())
}
