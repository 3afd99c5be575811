//! Turbidity (soil load) sensor.
//!
//! Output voltage falls as turbidity rises: 1 mV per NTU below a 3.0 V
//! reference, offset by 1500 NTU.  The cycle program only needs a
//! clean/dirty decision, so the NTU level is logged and then classified.

use core::fmt;

use log::debug;

use crate::config::Calibration;
use crate::hal::Hal;
use crate::pins;

/// Wash-water classification.  Wire values are −1 / +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Turbidity {
    Clean = -1,
    Dirty = 1,
}

impl Turbidity {
    pub const fn value(self) -> i8 {
        self as i8
    }

    pub fn is_dirty(self) -> bool {
        self == Self::Dirty
    }
}

impl fmt::Display for Turbidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Dirty => write!(f, "dirty"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurbidityReading {
    pub raw: u16,
    pub volts: f32,
    pub ntu: f32,
    pub class: Turbidity,
}

/// Pure conversion of a raw ADC count.
pub fn classify(raw: u16, cal: &Calibration) -> TurbidityReading {
    let volts = cal.volts(raw);
    let ntu = (volts - cal.turbidity_offset_volts) / cal.dirty_scale + cal.turbidity_offset_ntu;
    let class = if ntu > cal.dirty_level_ntu {
        Turbidity::Dirty
    } else {
        Turbidity::Clean
    };
    TurbidityReading { raw, volts, ntu, class }
}

pub fn read<H: Hal>(hal: &mut H, cal: &Calibration) -> TurbidityReading {
    let r = classify(hal.analog_read(pins::TURBIDITY_ADC), cal);
    debug!("turbidity: {:.0} NTU ({})", r.ntu, r.class);
    r
}
