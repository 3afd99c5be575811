//! Pulse-output water flow meter.
//!
//! The meter emits pulses at a frequency proportional to flow.  They clock
//! a hardware timer through its external input, so counting costs no CPU:
//! the foreground arms the counter, sleeps one sample window, and reads it
//! back.  Arming and read-back happen with interrupts masked so the window
//! boundaries are atomic with respect to the counter.
//!
//! A measurement takes three windows.  When the pump has just started the
//! first window is usually short of the steady rate, so if the first two
//! disagree by more than the stability ratio the first is dropped and the
//! second window is taken again, until the pair agrees.  A calibration may
//! cap the number of discards.

use log::warn;

use crate::config::Calibration;
use crate::hal::{Hal, interrupt_free};
use crate::pins;

/// Windows averaged per measurement.
pub const WINDOWS: usize = 3;

/// Result of a flow measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowReading {
    /// Pulse counts of the accepted windows.
    pub counts: [u16; WINDOWS],
    /// First windows discarded as start-up transients.
    pub discarded: u32,
    /// Flow rate (L/s).
    pub litres_per_sec: f32,
}

/// Count pulses over one sample window.  Blocks for `period_ms`.
pub fn count_pulses<H: Hal>(hal: &mut H, period_ms: u32) -> u16 {
    interrupt_free(hal, |h| {
        h.configure_pulse_counter(pins::FLOW_COUNTER_TIMER);
        h.clear_pulse_count(pins::FLOW_COUNTER_TIMER);
    });

    hal.delay_ms(period_ms);

    interrupt_free(hal, |h| h.pulse_count(pins::FLOW_COUNTER_TIMER))
}

/// True when `first` is within `ratio` of `second`.
pub fn is_stable(first: u16, second: u16, ratio: f32) -> bool {
    let gap = first.abs_diff(second);
    gap as f32 <= second as f32 * ratio
}

/// Flow from three window counts.
///
/// `2·Σ/3` is computed in integer pulses before scaling.
pub fn flow_from_counts(counts: &[u16; WINDOWS], flow_scale: f32) -> f32 {
    let sum: u32 = counts.iter().map(|&c| u32::from(c)).sum();
    (2 * sum / 3) as f32 * flow_scale
}

/// Full measurement: three windows with start-up transient rejection.
pub fn measure<H: Hal>(hal: &mut H, cal: &Calibration) -> FlowReading {
    let mut counts = [0u16; WINDOWS];
    let mut discarded = 0u32;
    let mut i = 0;

    while i < WINDOWS {
        counts[i] = count_pulses(hal, cal.sample_period_ms);
        if i == 1 && !is_stable(counts[0], counts[1], cal.flow_stability_ratio) {
            let capped = cal
                .flow_max_resamples
                .is_some_and(|max| discarded >= u32::from(max));
            if !capped {
                counts[0] = counts[1];
                discarded = discarded.saturating_add(1);
                continue;
            }
            warn!(
                "flow: no stable pair after {} discards ({} vs {}), accepting",
                discarded, counts[0], counts[1]
            );
        }
        i += 1;
    }

    FlowReading {
        counts,
        discarded,
        litres_per_sec: flow_from_counts(&counts, cal.flow_scale),
    }
}
