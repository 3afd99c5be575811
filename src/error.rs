//! Error types for the dishwasher control core.
//!
//! The only error the core surfaces is an [`Escape`]: a guarded activation
//! whose preconditions failed, carrying the [`ReasonCode`] the cycle
//! program's recovery point dispatches on.  All types are `Copy` so they can
//! be passed through the recovery trampoline without allocation.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::actuators::Actuator;

// ---------------------------------------------------------------------------
// Reason codes
// ---------------------------------------------------------------------------

/// Integer discriminator delivered to the recovery point.
///
/// Wire values are fixed: 1–5.  Codes 2 and 5 are never raised by an
/// actuator; the cycle program raises them for its own phase-level errors
/// through [`ActuatorController::error_management`](crate::actuators::ActuatorController::error_management).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum ReasonCode {
    /// Main relay required but LOW.
    MainRelayOff = 1,
    /// Reserved for the cycle program.
    Reserved2 = 2,
    /// Wash pump required but LOW.
    WashPumpOff = 3,
    /// Wash pump required LOW but running.
    WashPumpRunning = 4,
    /// Reserved for the cycle program.
    Reserved5 = 5,
}

impl ReasonCode {
    /// Sentinel passed to `error_management` when no error occurred.
    /// Never delivered to the recovery point.
    pub const NONE: i8 = -1;

    /// Wire value.
    pub const fn code(self) -> i8 {
        self as i8
    }
}

impl TryFrom<i8> for ReasonCode {
    type Error = InvalidReasonCode;

    fn try_from(code: i8) -> core::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::MainRelayOff),
            2 => Ok(Self::Reserved2),
            3 => Ok(Self::WashPumpOff),
            4 => Ok(Self::WashPumpRunning),
            5 => Ok(Self::Reserved5),
            other => Err(InvalidReasonCode(other)),
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainRelayOff => write!(f, "main relay off"),
            Self::Reserved2 => write!(f, "cycle phase error (2)"),
            Self::WashPumpOff => write!(f, "wash pump off"),
            Self::WashPumpRunning => write!(f, "wash pump running"),
            Self::Reserved5 => write!(f, "cycle phase error (5)"),
        }
    }
}

/// An integer outside the reason-code taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidReasonCode(pub i8);

impl fmt::Display for InvalidReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid reason code {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Escape
// ---------------------------------------------------------------------------

/// Transfer of control to the registered recovery point.
///
/// Returned by every guarded `*_on` command whose preconditions fail, and by
/// `error_management` for caller-raised phase codes.  Propagate it with `?`
/// up to [`ActuatorController::guarded`](crate::actuators::ActuatorController::guarded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Escape {
    pub reason: ReasonCode,
    /// Actuator whose activation was refused; `None` for caller-raised codes.
    pub actuator: Option<Actuator>,
}

impl Escape {
    pub const fn new(reason: ReasonCode, actuator: Option<Actuator>) -> Self {
        Self { reason, actuator }
    }

    /// Wire value delivered to the recovery point.
    pub const fn code(&self) -> i8 {
        self.reason.code()
    }
}

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.actuator {
            Some(a) => write!(f, "{a} refused: {} (code {})", self.reason, self.code()),
            None => write!(f, "{} (code {})", self.reason, self.code()),
        }
    }
}

/// Convenience alias for guarded commands.
pub type Result<T> = core::result::Result<T, Escape>;

// ---------------------------------------------------------------------------
// Target HAL bring-up
// ---------------------------------------------------------------------------

/// Errors during one-shot peripheral initialisation on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    TimerCreateFailed(i32),
}

impl fmt::Display for HwInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::TimerCreateFailed(rc) => write!(f, "reversal timer create failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}
