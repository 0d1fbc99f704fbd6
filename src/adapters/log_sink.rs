//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => info!("START | initial_mode={:?}", mode),
            AppEvent::ModeChanged { from, to } => info!("MODE | {:?} -> {:?}", from, to),
            AppEvent::KeyAccepted => info!("KEY | accepted"),
            AppEvent::EntryStarted(mode) => info!("ENTRY | started in {:?}", mode),
            AppEvent::PasscodeRejected(mode) => warn!("ENTRY | rejected in {:?}", mode),
            AppEvent::Intrusion(source) => warn!("ALARM | intrusion via {:?}", source),
            AppEvent::DisplaySleep => info!("DISPLAY | sleep"),
            AppEvent::DisplayWake => info!("DISPLAY | wake"),
        }
    }
}
