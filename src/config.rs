//! Sensor calibration parameters.
//!
//! Defaults are the factory calibration of the reference machine.  The
//! struct is serde-derivable so a cycle program may ship its own table, but
//! the core never loads or persists it.

use serde::{Deserialize, Serialize};

/// Calibration and timing for the sensor interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    // --- ADC ---
    /// ADC reference voltage (V).
    pub adc_ref_volts: f32,
    /// ADC counts spanning the reference (10-bit → 1024).
    pub adc_counts: f32,

    // --- Thermistor ---
    /// Thermistor output at 0 °C (V).
    pub temp_offset_volts: f32,
    /// Thermistor slope (V/°C).
    pub temp_scale: f32,

    // --- Turbidity ---
    /// Turbidity sensor reference voltage (V).
    pub turbidity_offset_volts: f32,
    /// Turbidity slope (V/NTU); negative, output falls as soil rises.
    pub dirty_scale: f32,
    /// NTU added after scaling.
    pub turbidity_offset_ntu: f32,
    /// Water above this turbidity is dirty (NTU).
    pub dirty_level_ntu: f32,

    // --- Flow ---
    /// Flow-meter scale ((L/s)/Hz).
    pub flow_scale: f32,
    /// Pulse-counting window (ms).
    pub sample_period_ms: u32,
    /// Relative gap between the first two windows above which the first is
    /// discarded as a start-up transient.
    pub flow_stability_ratio: f32,
    /// Optional cap on discards per measurement.  `None` resamples until
    /// the first two windows agree; with a cap the last pair is accepted.
    pub flow_max_resamples: Option<u8>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            adc_ref_volts: 5.0,
            adc_counts: 1024.0,

            temp_offset_volts: 2.5,
            temp_scale: 0.025,

            turbidity_offset_volts: 3.0,
            dirty_scale: -0.001,
            turbidity_offset_ntu: 1500.0,
            dirty_level_ntu: 500.0,

            flow_scale: 0.000_25,
            sample_period_ms: 500,
            flow_stability_ratio: 0.1,
            flow_max_resamples: None,
        }
    }
}

impl Calibration {
    /// Reject tables that would divide by zero or stall the flow window.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.adc_counts <= 0.0 {
            return Err("adc_counts must be positive");
        }
        if self.temp_scale == 0.0 {
            return Err("temp_scale must be non-zero");
        }
        if self.dirty_scale == 0.0 {
            return Err("dirty_scale must be non-zero");
        }
        if self.sample_period_ms == 0 {
            return Err("sample_period_ms must be positive");
        }
        if self.flow_stability_ratio < 0.0 {
            return Err("flow_stability_ratio must not be negative");
        }
        Ok(())
    }

    /// Convert a raw ADC count to volts.
    pub fn volts(&self, raw: u16) -> f32 {
        raw as f32 * self.adc_ref_volts / self.adc_counts
    }
}
