//! Intrusion sensors.
//!
//! Both sensors report into the mode machine through the alarm service;
//! neither is sampled outside Armed mode.

pub mod ranger;
pub mod trigger;

pub use ranger::EchoRanger;
pub use trigger::DigitalTrigger;
