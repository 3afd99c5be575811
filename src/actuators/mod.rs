//! Actuator controller: state cache, guarded setters and the escape path.
//!
//! Every output has an unconditional `*_off` and an `*_on`.  Apart from the
//! main relay, each `*_on` is guarded: it checks the precondition row for
//! its actuator (see [`state`]) against the cache, and either
//!
//! * drives the pin HIGH and sets the cache field, returning `Ok(())`, or
//! * leaves pin and cache untouched and returns an [`Escape`] carrying the
//!   lowest failing [`ReasonCode`].
//!
//! Escapes are delivered to the registered [`RecoveryPoint`] by the
//! [`guarded`](ActuatorController::guarded) trampoline.
//!
//! ## Safety contract
//!
//! Preconditions are checked on activation only.  Turning a prerequisite
//! off does not cascade to its dependents; callers order their `*_off`
//! commands, or use [`all_off`](ActuatorController::all_off).

pub mod reversal;
pub mod state;

use heapless::HistoryBuffer;
use log::{debug, error, info, warn};

use crate::error::{Escape, ReasonCode, Result};
use crate::hal::{Hal, PinMode};
use crate::pins;
use crate::recovery::{ESCAPE_HISTORY_LEN, EscapeRecord, Flow, RecoveryPoint};

pub use state::{Actuator, ActuatorState, Precondition};

/// Nominal dispenser hold before `dispenser_off`.  Timed by the caller.
pub const DISPENSER_HOLD_SECS: u32 = 45;
/// Time needed to dispense one dose.  Advisory to the cycle program.
pub const DISPENSE_TIME_SECS: u32 = 10;

pub struct ActuatorController<H: Hal> {
    hal: H,
    state: ActuatorState,
    recovery: Option<RecoveryPoint<H>>,
    escapes: HistoryBuffer<EscapeRecord, ESCAPE_HISTORY_LEN>,
}

impl<H: Hal> ActuatorController<H> {
    /// Take ownership of a HAL handle and configure every output pin.
    ///
    /// Pins are not driven here; call [`init_state`](Self::init_state).
    pub fn new(mut hal: H) -> Self {
        for pin in pins::OUTPUT_PINS {
            hal.pin_mode(pin, PinMode::Output);
        }
        Self {
            hal,
            state: ActuatorState::all_off(),
            recovery: None,
            escapes: HistoryBuffer::new(),
        }
    }

    /// Zero the cache, drive every controlled pin LOW, and disarm reversal.
    pub fn init_state(&mut self) {
        self.hal.set_overflow_interrupt(pins::REVERSAL_TIMER, false);
        for pin in pins::OUTPUT_PINS {
            self.hal.digital_write(pin, false);
        }
        reversal::reset();
        self.state = ActuatorState::all_off();
        info!("actuators: state initialised, all outputs LOW");
    }

    // ── Recovery ──────────────────────────────────────────────

    /// Arm the escape target.  Replaces any previous registration.
    pub fn register_recovery(&mut self, point: RecoveryPoint<H>) {
        if let Some(old) = self.recovery.replace(point) {
            info!("actuators: recovery point '{}' replaces '{}'", point.name(), old.name());
        } else {
            info!("actuators: recovery point '{}' registered", point.name());
        }
    }

    pub fn recovery_registered(&self) -> bool {
        self.recovery.is_some()
    }

    /// Single escape point.
    ///
    /// `-1` ([`ReasonCode::NONE`]) means no error and returns `Ok(())`.
    /// Codes 1–5 return an [`Escape`]; the cycle program uses this to raise
    /// its reserved phase codes.  Any other value is ignored.
    pub fn error_management(&mut self, code: i8) -> Result<()> {
        if code == ReasonCode::NONE {
            return Ok(());
        }
        match ReasonCode::try_from(code) {
            Ok(reason) => Err(Escape::new(reason, None)),
            Err(e) => {
                warn!("actuators: {e} ignored");
                Ok(())
            }
        }
    }

    /// Trampoline standing in for the registered recovery point.
    ///
    /// Runs `body`.  If it escapes, the escape is recorded, the registered
    /// handler runs, and [`Flow::Recovered`] carries the code back.
    pub fn guarded<T>(&mut self, body: impl FnOnce(&mut Self) -> Result<T>) -> Flow<T> {
        match body(self) {
            Ok(v) => Flow::Completed(v),
            Err(escape) => {
                self.deliver(escape);
                Flow::Recovered(escape.reason)
            }
        }
    }

    fn deliver(&mut self, escape: Escape) {
        self.escapes.write(escape.into());
        match self.recovery {
            Some(point) => {
                warn!("actuators: escape to '{}': {escape}", point.name());
                point.resume(self, escape.reason);
            }
            None => error!("actuators: escape with no recovery point registered: {escape}"),
        }
    }

    /// Recent escapes, oldest first.
    pub fn escapes(&self) -> impl Iterator<Item = &EscapeRecord> {
        self.escapes.oldest_ordered()
    }

    pub fn last_escape(&self) -> Option<&EscapeRecord> {
        self.escapes.recent()
    }

    // ── State ─────────────────────────────────────────────────

    /// Snapshot of the state cache.
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    pub fn is_on(&self, actuator: Actuator) -> bool {
        self.state.get(actuator)
    }

    // ── Generic paths ─────────────────────────────────────────

    /// Guarded OFF→ON transition.
    ///
    /// The check result always goes through [`error_management`](Self::error_management),
    /// `-1` when every precondition holds.
    pub fn activate(&mut self, actuator: Actuator) -> Result<()> {
        let code = state::check(actuator, &self.state).map_or(ReasonCode::NONE, ReasonCode::code);
        self.error_management(code).map_err(|e| {
            debug!("actuators: {actuator} refused ({})", e.reason);
            Escape::new(e.reason, Some(actuator))
        })?;
        self.drive(actuator, true);
        if actuator == Actuator::Diverter {
            self.sync_direction_pair();
            self.hal.set_overflow_interrupt(pins::REVERSAL_TIMER, true);
            self.state.reversal_timer_armed = true;
        }
        Ok(())
    }

    /// Unconditional ON→OFF transition.
    pub fn deactivate(&mut self, actuator: Actuator) {
        self.drive(actuator, false);
        if actuator == Actuator::Diverter {
            self.hal.set_overflow_interrupt(pins::REVERSAL_TIMER, false);
            self.state.reversal_timer_armed = false;
        }
    }

    /// Drive the direction pair to the current phase.  Only called while the
    /// reversal interrupt is disarmed.
    fn sync_direction_pair(&mut self) {
        let phase = reversal::phase();
        self.hal.digital_write(pins::DIVERTER_DIR_1_PIN, !phase);
        self.hal.digital_write(pins::DIVERTER_DIR_2_PIN, phase);
    }

    /// Pin first, cache immediately after.
    fn drive(&mut self, actuator: Actuator, on: bool) {
        self.hal.digital_write(actuator.pin(), on);
        self.state.set(actuator, on);
        debug!("actuators: {actuator} {}", if on { "ON" } else { "OFF" });
    }

    /// Everything OFF, dependents before their prerequisites.
    pub fn all_off(&mut self) {
        const ORDER: [Actuator; Actuator::COUNT] = [
            Actuator::Dispenser,
            Actuator::Diverter,
            Actuator::Heater,
            Actuator::DryerFan,
            Actuator::FillValve,
            Actuator::RegenValve,
            Actuator::DrainPump,
            Actuator::WashPump,
            Actuator::MainRelay,
        ];
        for a in ORDER {
            self.deactivate(a);
        }
    }

    // ── Main relay (unguarded) ────────────────────────────────

    pub fn main_relay_on(&mut self) {
        self.drive(Actuator::MainRelay, true);
    }

    pub fn main_relay_off(&mut self) {
        self.deactivate(Actuator::MainRelay);
    }

    // ── Wash pump ─────────────────────────────────────────────

    /// Requires the main relay.
    pub fn wash_pump_on(&mut self) -> Result<()> {
        self.activate(Actuator::WashPump)
    }

    pub fn wash_pump_off(&mut self) {
        self.deactivate(Actuator::WashPump);
    }

    // ── Heater ────────────────────────────────────────────────

    /// Requires the wash pump to be circulating.
    pub fn heater_on(&mut self) -> Result<()> {
        self.activate(Actuator::Heater)
    }

    pub fn heater_off(&mut self) {
        self.deactivate(Actuator::Heater);
    }

    // ── Valves ────────────────────────────────────────────────

    pub fn fill_valve_on(&mut self) -> Result<()> {
        self.activate(Actuator::FillValve)
    }

    pub fn fill_valve_off(&mut self) {
        self.deactivate(Actuator::FillValve);
    }

    pub fn regen_valve_on(&mut self) -> Result<()> {
        self.activate(Actuator::RegenValve)
    }

    pub fn regen_valve_off(&mut self) {
        self.deactivate(Actuator::RegenValve);
    }

    // ── Diverter ──────────────────────────────────────────────

    /// Requires main relay and wash pump.  Also arms periodic reversal.
    pub fn diverter_on(&mut self) -> Result<()> {
        self.activate(Actuator::Diverter)
    }

    /// Also disarms periodic reversal.
    pub fn diverter_off(&mut self) {
        self.deactivate(Actuator::Diverter);
    }

    // ── Drain pump ────────────────────────────────────────────

    pub fn drain_pump_on(&mut self) -> Result<()> {
        self.activate(Actuator::DrainPump)
    }

    pub fn drain_pump_off(&mut self) {
        self.deactivate(Actuator::DrainPump);
    }

    // ── Dryer fan ─────────────────────────────────────────────

    /// Requires main relay and the wash pump stopped.
    pub fn dryer_fan_on(&mut self) -> Result<()> {
        self.activate(Actuator::DryerFan)
    }

    pub fn dryer_fan_off(&mut self) {
        self.deactivate(Actuator::DryerFan);
    }

    // ── Dispenser ─────────────────────────────────────────────

    /// Requires main relay and wash pump.  Only asserts the pin; hold it for
    /// [`DISPENSER_HOLD_SECS`] before [`dispenser_off`](Self::dispenser_off).
    pub fn dispenser_on(&mut self) -> Result<()> {
        self.activate(Actuator::Dispenser)
    }

    pub fn dispenser_off(&mut self) {
        self.deactivate(Actuator::Dispenser);
    }
}
