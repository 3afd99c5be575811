//! Reservoir level switches (salt, rinse aid).
//!
//! Float switches wired to digital inputs, HIGH when the reservoir still
//! holds product.  No debouncing or derivation; the last sample is kept so
//! it can be reported without touching the pin again.

use crate::hal::Hal;
use crate::pins::{self, Pin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservoir {
    Salt,
    RinseAid,
}

impl Reservoir {
    pub const fn pin(self) -> Pin {
        match self {
            Self::Salt => pins::SALT_LEVEL_PIN,
            Self::RinseAid => pins::RINSE_AID_LEVEL_PIN,
        }
    }
}

/// Last sampled level of both reservoirs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelSwitches {
    salt: bool,
    rinse_aid: bool,
}

impl LevelSwitches {
    /// Sample `reservoir`, store and return the level.
    pub fn read<H: Hal>(&mut self, hal: &mut H, reservoir: Reservoir) -> bool {
        let present = hal.digital_read(reservoir.pin());
        match reservoir {
            Reservoir::Salt => self.salt = present,
            Reservoir::RinseAid => self.rinse_aid = present,
        }
        present
    }

    pub fn last(&self, reservoir: Reservoir) -> bool {
        match reservoir {
            Reservoir::Salt => self.salt,
            Reservoir::RinseAid => self.rinse_aid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimHal;

    #[test]
    fn read_updates_only_the_sampled_reservoir() {
        let mut hal = SimHal::new();
        let mut levels = LevelSwitches::default();
        hal.set_input(pins::SALT_LEVEL_PIN, true);
        hal.set_input(pins::RINSE_AID_LEVEL_PIN, true);

        assert!(levels.read(&mut hal, Reservoir::Salt));
        assert!(levels.last(Reservoir::Salt));
        assert!(!levels.last(Reservoir::RinseAid));

        hal.set_input(pins::SALT_LEVEL_PIN, false);
        assert!(levels.last(Reservoir::Salt), "cached until re-read");
        assert!(!levels.read(&mut hal, Reservoir::Salt));
    }
}
