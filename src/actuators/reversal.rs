//! Diverter flow reversal, driven by the reversal timer's overflow interrupt.
//!
//! While the diverter is engaged the controller arms the overflow interrupt;
//! each overflow flips the direction output pair so the spray arms are fed
//! alternately.  The handler owns only the two direction pins and the
//! atomics below.  It never reads or writes the actuator state cache.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::hal::DirectionOutputs;
use crate::pins;

/// Current direction phase.  `false` = dir 1 HIGH, dir 2 LOW.
static PHASE: AtomicBool = AtomicBool::new(false);

/// Number of reversals since boot.
static EDGES: AtomicU32 = AtomicU32::new(0);

/// Overflow handler.  Lock-free; safe to call from interrupt context.
pub fn on_overflow(out: &mut impl DirectionOutputs) {
    let phase = !PHASE.fetch_xor(true, Ordering::Relaxed);
    out.write_direction(pins::DIVERTER_DIR_1_PIN, !phase);
    out.write_direction(pins::DIVERTER_DIR_2_PIN, phase);
    EDGES.fetch_add(1, Ordering::Relaxed);
}

/// Back to the boot phase.  Call only with the overflow interrupt disarmed.
pub fn reset() {
    PHASE.store(false, Ordering::Relaxed);
}

/// Reversals performed since boot.
pub fn edge_count() -> u32 {
    EDGES.load(Ordering::Relaxed)
}

/// Current phase (`true` after an odd number of reversals).
pub fn phase() -> bool {
    PHASE.load(Ordering::Relaxed)
}
