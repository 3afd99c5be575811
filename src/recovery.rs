//! Recovery contract between the cycle program and the actuator controller.
//!
//! The cycle program registers one [`RecoveryPoint`] at boot.  Its phase
//! code runs inside [`ActuatorController::guarded`], propagating any
//! [`Escape`] with `?`.  When a body escapes, the trampoline records it and
//! hands the [`ReasonCode`] to the registered handler.  It then returns
//! [`Flow::Recovered`] so the caller resumes at a single known place.
//!
//! ```text
//!  cycle phase ──▶ guarded(|ctl| { ctl.wash_pump_on()?; … })
//!                         │ Err(Escape)
//!                         ▼
//!                  escape history ──▶ handler(ctl, code) ──▶ Flow::Recovered(code)
//! ```
//!
//! Every frame between the failing command and the trampoline unwinds
//! normally, so drop-based cleanup on those frames still runs.

use core::fmt;

use crate::actuators::{Actuator, ActuatorController};
use crate::error::{Escape, ReasonCode};
use crate::hal::Hal;

/// Handler invoked with the controller and the reason code after an escape.
pub type RecoveryHandler<H> = fn(&mut ActuatorController<H>, ReasonCode);

/// The cycle program's resume point.
pub struct RecoveryPoint<H: Hal> {
    name: &'static str,
    handler: RecoveryHandler<H>,
}

impl<H: Hal> RecoveryPoint<H> {
    pub const fn new(name: &'static str, handler: RecoveryHandler<H>) -> Self {
        Self { name, handler }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn resume(&self, controller: &mut ActuatorController<H>, reason: ReasonCode) {
        (self.handler)(controller, reason);
    }
}

// Manual impls: a fn pointer is `Copy` for every `H`, but a derive would
// demand `H: Copy`.
impl<H: Hal> Clone for RecoveryPoint<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: Hal> Copy for RecoveryPoint<H> {}

impl<H: Hal> fmt::Debug for RecoveryPoint<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryPoint").field("name", &self.name).finish()
    }
}

/// Outcome of a guarded body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow<T> {
    /// The body returned normally.
    Completed(T),
    /// The body escaped; the recovery handler has already run.
    Recovered(ReasonCode),
}

impl<T> Flow<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Reason code if the body escaped.
    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Completed(_) => None,
            Self::Recovered(r) => Some(*r),
        }
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(v) => Some(v),
            Self::Recovered(_) => None,
        }
    }
}

/// Entry in the controller's escape history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeRecord {
    pub reason: ReasonCode,
    pub actuator: Option<Actuator>,
}

impl From<Escape> for EscapeRecord {
    fn from(e: Escape) -> Self {
        Self { reason: e.reason, actuator: e.actuator }
    }
}

/// Capacity of the escape history ring.
pub const ESCAPE_HISTORY_LEN: usize = 8;
