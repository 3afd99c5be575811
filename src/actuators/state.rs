//! Actuator identity, the mirrored state cache, and the precondition table.
//!
//! Each guarded activation is described by a static row of
//! [`Precondition`]s, with no closures or dynamic dispatch.  The controller
//! walks the row against the cache and picks the lowest failing code.
//!
//! ```text
//!  actuator      requires
//!  ───────────── ───────────────────────────────
//!  main_relay    (none)
//!  wash_pump     main_relay
//!  heater        wash_pump
//!  fill_valve    main_relay
//!  regen_valve   main_relay
//!  diverter      main_relay, wash_pump
//!  drain_pump    main_relay
//!  dryer_fan     main_relay, !wash_pump
//!  dispenser     main_relay, wash_pump
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReasonCode;
use crate::pins::{self, Pin};

// ---------------------------------------------------------------------------
// Actuator identity
// ---------------------------------------------------------------------------

/// Every output the controller caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Actuator {
    MainRelay = 0,
    WashPump = 1,
    Heater = 2,
    FillValve = 3,
    RegenValve = 4,
    Diverter = 5,
    DrainPump = 6,
    DryerFan = 7,
    Dispenser = 8,
}

impl Actuator {
    pub const COUNT: usize = 9;

    /// All actuators in cache order.
    pub const ALL: [Actuator; Self::COUNT] = [
        Self::MainRelay,
        Self::WashPump,
        Self::Heater,
        Self::FillValve,
        Self::RegenValve,
        Self::Diverter,
        Self::DrainPump,
        Self::DryerFan,
        Self::Dispenser,
    ];

    /// Control pin.
    pub const fn pin(self) -> Pin {
        match self {
            Self::MainRelay => pins::MAIN_RELAY_PIN,
            Self::WashPump => pins::WASH_PUMP_PIN,
            Self::Heater => pins::HEATER_PIN,
            Self::FillValve => pins::FILL_VALVE_PIN,
            Self::RegenValve => pins::REGEN_VALVE_PIN,
            Self::Diverter => pins::DIVERTER_PIN,
            Self::DrainPump => pins::DRAIN_PUMP_PIN,
            Self::DryerFan => pins::DRYER_FAN_PIN,
            Self::Dispenser => pins::DISPENSER_PIN,
        }
    }

    /// Preconditions checked before driving this actuator HIGH.
    pub const fn preconditions(self) -> &'static [Precondition] {
        use Precondition::{MainRelayOn, WashPumpIdle, WashPumpRunning};
        match self {
            Self::MainRelay => &[],
            Self::WashPump | Self::FillValve | Self::RegenValve | Self::DrainPump => &[MainRelayOn],
            Self::Heater => &[WashPumpRunning],
            Self::Diverter | Self::Dispenser => &[MainRelayOn, WashPumpRunning],
            Self::DryerFan => &[MainRelayOn, WashPumpIdle],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::MainRelay => "main relay",
            Self::WashPump => "wash pump",
            Self::Heater => "heater",
            Self::FillValve => "fill valve",
            Self::RegenValve => "regen valve",
            Self::Diverter => "diverter",
            Self::DrainPump => "drain pump",
            Self::DryerFan => "dryer fan",
            Self::Dispenser => "dispenser",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// A single predicate over the state cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    MainRelayOn,
    WashPumpRunning,
    WashPumpIdle,
}

impl Precondition {
    pub fn holds(self, state: &ActuatorState) -> bool {
        match self {
            Self::MainRelayOn => state.main_relay,
            Self::WashPumpRunning => state.wash_pump,
            Self::WashPumpIdle => !state.wash_pump,
        }
    }

    /// Code delivered when this predicate fails.
    pub const fn reason(self) -> ReasonCode {
        match self {
            Self::MainRelayOn => ReasonCode::MainRelayOff,
            Self::WashPumpRunning => ReasonCode::WashPumpOff,
            Self::WashPumpIdle => ReasonCode::WashPumpRunning,
        }
    }
}

/// Lowest failing reason code for activating `actuator`, or `None` if every
/// precondition holds.
pub fn check(actuator: Actuator, state: &ActuatorState) -> Option<ReasonCode> {
    actuator
        .preconditions()
        .iter()
        .filter(|p| !p.holds(state))
        .map(|p| p.reason())
        .min()
}

// ---------------------------------------------------------------------------
// State cache
// ---------------------------------------------------------------------------

/// Mirror of every controlled pin, plus the reversal-timer flag.
///
/// Written only by the foreground, always back-to-back with the pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorState {
    pub main_relay: bool,
    pub wash_pump: bool,
    pub heater: bool,
    pub fill_valve: bool,
    pub regen_valve: bool,
    pub diverter: bool,
    pub drain_pump: bool,
    pub dryer_fan: bool,
    pub dispenser: bool,
    /// Diverter reversal overflow interrupt enabled.
    pub reversal_timer_armed: bool,
}

impl ActuatorState {
    /// Everything LOW.
    pub const fn all_off() -> Self {
        Self {
            main_relay: false,
            wash_pump: false,
            heater: false,
            fill_valve: false,
            regen_valve: false,
            diverter: false,
            drain_pump: false,
            dryer_fan: false,
            dispenser: false,
            reversal_timer_armed: false,
        }
    }

    pub fn get(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::MainRelay => self.main_relay,
            Actuator::WashPump => self.wash_pump,
            Actuator::Heater => self.heater,
            Actuator::FillValve => self.fill_valve,
            Actuator::RegenValve => self.regen_valve,
            Actuator::Diverter => self.diverter,
            Actuator::DrainPump => self.drain_pump,
            Actuator::DryerFan => self.dryer_fan,
            Actuator::Dispenser => self.dispenser,
        }
    }

    pub(crate) fn set(&mut self, actuator: Actuator, on: bool) {
        let field = match actuator {
            Actuator::MainRelay => &mut self.main_relay,
            Actuator::WashPump => &mut self.wash_pump,
            Actuator::Heater => &mut self.heater,
            Actuator::FillValve => &mut self.fill_valve,
            Actuator::RegenValve => &mut self.regen_valve,
            Actuator::Diverter => &mut self.diverter,
            Actuator::DrainPump => &mut self.drain_pump,
            Actuator::DryerFan => &mut self.dryer_fan,
            Actuator::Dispenser => &mut self.dispenser,
        };
        *field = on;
    }

    /// True when every output and the reversal flag are LOW.
    pub fn is_all_off(&self) -> bool {
        *self == Self::all_off()
    }

    /// Actuators that are ON while one of their activation preconditions no
    /// longer holds.  Turning a prerequisite off does not cascade, so this
    /// can be non-empty after e.g. `main_relay_off` with the pump running.
    pub fn violations(&self) -> heapless::Vec<Actuator, { Actuator::COUNT }> {
        Actuator::ALL
            .iter()
            .copied()
            .filter(|&a| self.get(a) && check(a, self).is_some())
            .collect()
    }
}
