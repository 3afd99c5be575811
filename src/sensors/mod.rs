//! Sensor interface: calibrated readings for the cycle program.
//!
//! [`SensorInterface`] owns a HAL handle, the [`Calibration`] table and the
//! last sampled reservoir levels.  Every read is synchronous; only
//! [`measure_flow`](SensorInterface::measure_flow) blocks (three or more
//! sample windows).

pub mod flow;
pub mod level;
pub mod temperature;
pub mod turbidity;

use log::info;

use crate::config::Calibration;
use crate::hal::{Hal, PinMode};
use crate::pins;
use flow::FlowReading;
use level::{LevelSwitches, Reservoir};
use temperature::TemperatureReading;
use turbidity::{Turbidity, TurbidityReading};

/// Non-blocking readings, for telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub salt_present: bool,
    pub rinse_aid_present: bool,
    pub temperature_c: f32,
    pub turbidity_ntu: f32,
    pub turbidity: Turbidity,
}

pub struct SensorInterface<H: Hal> {
    hal: H,
    calibration: Calibration,
    levels: LevelSwitches,
}

impl<H: Hal> SensorInterface<H> {
    /// Take ownership of a HAL handle and configure the input pins.
    pub fn new(mut hal: H, calibration: Calibration) -> Self {
        for pin in pins::INPUT_PINS {
            hal.pin_mode(pin, PinMode::Input);
        }
        info!(
            "sensors: configured (window={}ms, dirty>{} NTU)",
            calibration.sample_period_ms, calibration.dirty_level_ntu
        );
        Self {
            hal,
            calibration,
            levels: LevelSwitches::default(),
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    // ── Reservoir levels ──────────────────────────────────────

    /// Sample the salt switch.  `true` = salt present.
    pub fn read_salt_level(&mut self) -> bool {
        self.levels.read(&mut self.hal, Reservoir::Salt)
    }

    /// Sample the rinse-aid switch.  `true` = rinse aid present.
    pub fn read_rinse_aid_level(&mut self) -> bool {
        self.levels.read(&mut self.hal, Reservoir::RinseAid)
    }

    /// Last sampled salt level.
    pub fn salt_level(&self) -> bool {
        self.levels.last(Reservoir::Salt)
    }

    /// Last sampled rinse-aid level.
    pub fn rinse_aid_level(&self) -> bool {
        self.levels.last(Reservoir::RinseAid)
    }

    // ── Analog ────────────────────────────────────────────────

    /// Water temperature (°C).
    pub fn measure_temperature(&mut self) -> f32 {
        self.read_temperature().celsius
    }

    pub fn read_temperature(&mut self) -> TemperatureReading {
        temperature::read(&mut self.hal, &self.calibration)
    }

    /// Clean (−1) or dirty (+1).
    pub fn measure_turbidity(&mut self) -> Turbidity {
        self.read_turbidity().class
    }

    pub fn read_turbidity(&mut self) -> TurbidityReading {
        turbidity::read(&mut self.hal, &self.calibration)
    }

    // ── Flow ──────────────────────────────────────────────────

    /// Flow rate (L/s).  Blocks for at least three sample windows.
    pub fn measure_flow(&mut self) -> f32 {
        self.read_flow().litres_per_sec
    }

    pub fn read_flow(&mut self) -> FlowReading {
        flow::measure(&mut self.hal, &self.calibration)
    }

    // ── Aggregate ─────────────────────────────────────────────

    /// Sample every non-blocking sensor.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let salt_present = self.read_salt_level();
        let rinse_aid_present = self.read_rinse_aid_level();
        let temp = self.read_temperature();
        let turb = self.read_turbidity();
        SensorSnapshot {
            salt_present,
            rinse_aid_present,
            temperature_c: temp.celsius,
            turbidity_ntu: turb.ntu,
            turbidity: turb.class,
        }
    }
}
