//! One-shot GPIO initialization and interrupt wiring.
//!
//! Configures the keypad rows and indicator outputs, the edge-triggered
//! inputs, and installs the GPIO ISR service using raw ESP-IDF sys calls.
//! Called once from `main()` before the runtime threads start.
//!
//! ISR handlers only read a level, stamp the time and call
//! [`push_from_isr`](crate::events::EventQueue::push_from_isr).  They never
//! touch the alarm state, log or wake a thread.  The host build keeps a
//! simulated pin bank so [`GpioPin`] stays usable in tests.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

#[cfg(target_os = "espidf")]
use embassy_time::Instant;

#[cfg(target_os = "espidf")]
use crate::events::{EVENTS, Event};
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrRegisterFailed(i32),
    TimerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrRegisterFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
            Self::TimerFailed(rc) => write!(f, "esp_timer setup failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any thread is spawned.
    unsafe {
        init_gpio_outputs()?;
        init_gpio_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in &pins::OUTPUT_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

/// Column, trigger-sensor and echo lines: pull-down, interrupt on both edges.
#[cfg(target_os = "espidf")]
const EDGE_INPUTS: [i32; 6] = [
    pins::KEYPAD_COL_GPIOS[0],
    pins::KEYPAD_COL_GPIOS[1],
    pins::KEYPAD_COL_GPIOS[2],
    pins::KEYPAD_COL_GPIOS[3],
    pins::TRIGGER_SENSOR_GPIO,
    pins::RANGER_ECHO_GPIO,
];

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    for &pin in &EDGE_INPUTS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

// ── Raw pin access ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output pin configured in
    // init_gpio_outputs().
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: [core::sync::atomic::AtomicBool; 64] =
    [const { core::sync::atomic::AtomicBool::new(false) }; 64];

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    usize::try_from(pin)
        .ok()
        .and_then(|i| SIM_LEVELS.get(i))
        .is_some_and(|level| level.load(core::sync::atomic::Ordering::Acquire))
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    if let Some(level) = usize::try_from(pin).ok().and_then(|i| SIM_LEVELS.get(i)) {
        level.store(high, core::sync::atomic::Ordering::Release);
    }
}

/// A GPIO configured by [`init_peripherals`], exposed through the
/// `embedded-hal` digital traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin(i32);

impl GpioPin {
    pub const fn new(gpio: i32) -> Self {
        Self(gpio)
    }

    pub const fn number(self) -> i32 {
        self.0
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, true);
        Ok(())
    }
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(gpio_read(self.0))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!gpio_read(self.0))
    }
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn column_isr(arg: *mut core::ffi::c_void) {
    let pin = arg as i32;
    // SAFETY: register read; safe in ISR context.
    let high = unsafe { gpio_get_level(pin) } != 0;
    EVENTS.push_from_isr(if high { Event::ColumnRise } else { Event::ColumnFall });
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn trigger_sensor_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: register read; safe in ISR context.
    let high = unsafe { gpio_get_level(pins::TRIGGER_SENSOR_GPIO) } != 0;
    EVENTS.push_from_isr(if high { Event::TriggerRise } else { Event::TriggerFall });
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn echo_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: register read; safe in ISR context.
    let high = unsafe { gpio_get_level(pins::RANGER_ECHO_GPIO) } != 0;
    // esp_timer_get_time is IRAM-safe.
    let at = Instant::now();
    EVENTS.push_from_isr(if high { Event::EchoRise(at) } else { Event::EchoFall(at) });
}

#[cfg(target_os = "espidf")]
unsafe fn add_handler(
    pin: i32,
    handler: unsafe extern "C" fn(*mut core::ffi::c_void),
    arg: *mut core::ffi::c_void,
) -> Result<(), HwInitError> {
    let ret = unsafe { gpio_isr_handler_add(pin, Some(handler), arg) };
    if ret != ESP_OK {
        return Err(HwInitError::IsrRegisterFailed(ret));
    }
    unsafe { gpio_intr_enable(pin) };
    Ok(())
}

/// Install per-pin GPIO ISR service and register interrupt handlers.
/// Call after init_peripherals() and before the runtime starts.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable).  The handlers only read a
    // pin level and push into the event queue.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for &pin in &pins::KEYPAD_COL_GPIOS {
            add_handler(pin, column_isr, pin as *mut core::ffi::c_void)?;
        }
        add_handler(pins::TRIGGER_SENSOR_GPIO, trigger_sensor_isr, core::ptr::null_mut())?;
        add_handler(pins::RANGER_ECHO_GPIO, echo_isr, core::ptr::null_mut())?;

        info!("hw_init: ISR service installed (columns×4, trigger sensor, echo)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
