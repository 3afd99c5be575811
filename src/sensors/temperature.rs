//! Wash-water thermistor.
//!
//! Linear analog front end: the conditioned output sits at 2.5 V at 0 °C
//! and rises 25 mV/°C, read on a 10-bit ADC channel.  No range checking;
//! an open bridge reads as a large negative temperature and the cycle
//! program decides what to do with it.

use crate::config::Calibration;
use crate::hal::Hal;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub raw: u16,
    pub volts: f32,
    pub celsius: f32,
}

/// Convert a raw ADC count to a reading.
pub fn convert(raw: u16, cal: &Calibration) -> TemperatureReading {
    let volts = cal.volts(raw);
    TemperatureReading {
        raw,
        volts,
        celsius: (volts - cal.temp_offset_volts) / cal.temp_scale,
    }
}

pub fn read<H: Hal>(hal: &mut H, cal: &Calibration) -> TemperatureReading {
    convert(hal.analog_read(pins::THERMISTOR_ADC), cal)
}
