//! Hardware abstraction: the boundary between the control core and pins.
//!
//! ```text
//!   ActuatorController ──┐
//!                        ├──▶ Hal trait ──▶ EspHal (target) / SimHal (host)
//!   SensorInterface   ───┘
//! ```
//!
//! The [`Hal`] trait exposes only the primitives the upper layers invoke.
//! Implementations are cheap handles onto one physical board, so each
//! subsystem owns its own handle.

#[cfg(target_os = "espidf")]
pub mod esp;
#[cfg(not(target_os = "espidf"))]
pub mod sim;

use embedded_hal::delay::DelayNs;

use crate::pins::{AnalogChannel, Pin, TimerChannel};

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// Full-scale value of the 10-bit analog converter.
pub const ADC_MAX: u16 = 1023;

/// Board-level primitives.  `DelayNs` supplies the blocking sleep.
pub trait Hal: DelayNs {
    /// Set a pin's direction.
    fn pin_mode(&mut self, pin: Pin, mode: PinMode);

    /// Drive an output pin HIGH (`true`) or LOW.
    fn digital_write(&mut self, pin: Pin, high: bool);

    /// Sample a digital input.
    fn digital_read(&mut self, pin: Pin) -> bool;

    /// 10-bit analog sample (0 – [`ADC_MAX`]).
    fn analog_read(&mut self, channel: AnalogChannel) -> u16;

    /// Enable or disable the overflow interrupt of a timer channel.
    fn set_overflow_interrupt(&mut self, timer: TimerChannel, enabled: bool);

    /// Clock a timer channel from its external input, counting rising edges.
    fn configure_pulse_counter(&mut self, timer: TimerChannel);

    /// Zero a pulse counter.
    fn clear_pulse_count(&mut self, timer: TimerChannel);

    /// Current pulse count.
    fn pulse_count(&mut self, timer: TimerChannel) -> u16;

    /// Mask interrupts globally.
    fn disable_interrupts(&mut self);

    /// Unmask interrupts globally.
    fn enable_interrupts(&mut self);
}

/// Run `f` with interrupts masked.
pub fn interrupt_free<H: Hal, R>(hal: &mut H, f: impl FnOnce(&mut H) -> R) -> R {
    hal.disable_interrupts();
    let r = f(hal);
    hal.enable_interrupts();
    r
}

/// Output-only capability handed to interrupt handlers.
///
/// An ISR gets this instead of a full [`Hal`] so it cannot read inputs,
/// block, or reconfigure timers.
pub trait DirectionOutputs {
    fn write_direction(&mut self, pin: Pin, high: bool);
}
