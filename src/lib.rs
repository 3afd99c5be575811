//! Dishwasher control core.
//!
//! Guarded actuator switching with escape-to-recovery semantics, plus the
//! calibrated sensor front end.  Everything runs against the [`hal::Hal`]
//! trait; the ESP-IDF implementation is behind `#[cfg(target_os = "espidf")]`
//! and a simulated board is provided for host tests.

#![deny(unused_must_use)]

pub mod actuators;
pub mod config;
pub mod error;
pub mod hal;
pub mod pins;
pub mod recovery;
pub mod sensors;

pub use actuators::{Actuator, ActuatorController, ActuatorState};
pub use config::Calibration;
pub use error::{Escape, ReasonCode};
pub use recovery::{EscapeRecord, Flow, RecoveryPoint};
pub use sensors::SensorInterface;
