//! Shared rig for integration tests.
//!
//! Recovery handlers are plain `fn` pointers, so the recording handler
//! keeps its log in a thread-local.  Each test runs on its own thread.

use std::cell::RefCell;

use dishwasher::hal::sim::SimHal;
use dishwasher::{ActuatorController, ReasonCode, RecoveryPoint};

thread_local! {
    static RECOVERED: RefCell<Vec<ReasonCode>> = const { RefCell::new(Vec::new()) };
}

/// Records the code, then drops every load like the firmware's handler.
pub fn recording_handler(ctl: &mut ActuatorController<SimHal>, reason: ReasonCode) {
    RECOVERED.with(|r| r.borrow_mut().push(reason));
    ctl.all_off();
}

/// Codes delivered to [`recording_handler`] since the last call.
pub fn take_recovered() -> Vec<ReasonCode> {
    RECOVERED.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

/// Fresh board with a controller that is initialised and has a recovery point.
pub fn rig() -> (SimHal, ActuatorController<SimHal>) {
    let _ = take_recovered();
    let board = SimHal::new();
    let mut ctl = ActuatorController::new(board.clone());
    ctl.register_recovery(RecoveryPoint::new("test-recovery", recording_handler));
    ctl.init_state();
    (board, ctl)
}
