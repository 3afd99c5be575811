//! Simulated board for host builds and tests.
//!
//! [`SimHal`] is a cloneable handle onto one shared [`SimBoard`]: the
//! actuator controller and the sensor interface each own a clone, and the
//! test keeps another to inject inputs and inspect outputs.
//!
//! Time is virtual.  `DelayNs` advances the clock; while the reversal
//! timer's overflow interrupt is enabled, every [`REVERSAL_PERIOD_MS`] the
//! real reversal ISR runs against the board's direction pins.
//!
//! Pulse counting is scripted: each `clear_pulse_count` opens a window
//! whose count is the next value queued with [`SimHal::queue_pulse_windows`]
//! (or the steady rate once the queue is empty).  The count becomes visible
//! once the foreground sleeps.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use super::{ADC_MAX, DirectionOutputs, Hal, PinMode};
use crate::actuators::reversal;
use crate::pins::{self, AnalogChannel, Pin, REVERSAL_PERIOD_MS, TimerChannel};

const PIN_SPACE: usize = 256;
const TIMER_SPACE: usize = 8;
const ADC_SPACE: usize = 8;
const NS_PER_MS: u64 = 1_000_000;

/// State of the simulated board.
pub struct SimBoard {
    modes: [Option<PinMode>; PIN_SPACE],
    levels: [bool; PIN_SPACE],
    writes: [u32; PIN_SPACE],
    adc: [u16; ADC_SPACE],

    overflow_enabled: [bool; TIMER_SPACE],
    reversal_accum_ns: u64,
    reversals: u32,

    counter_configured: [bool; TIMER_SPACE],
    pulse_script: VecDeque<u16>,
    steady_pulses: u16,
    window_pulses: u16,
    count: u16,
    window_start_ns: u64,
    last_window_ms: Option<u64>,
    windows: u32,
    unguarded_counter_ops: u32,

    irq_disabled: bool,
    now_ns: u64,
}

impl SimBoard {
    fn new() -> Self {
        Self {
            modes: [None; PIN_SPACE],
            levels: [false; PIN_SPACE],
            writes: [0; PIN_SPACE],
            adc: [0; ADC_SPACE],
            overflow_enabled: [false; TIMER_SPACE],
            reversal_accum_ns: 0,
            reversals: 0,
            counter_configured: [false; TIMER_SPACE],
            pulse_script: VecDeque::new(),
            steady_pulses: 0,
            window_pulses: 0,
            count: 0,
            window_start_ns: 0,
            last_window_ms: None,
            windows: 0,
            unguarded_counter_ops: 0,
            irq_disabled: false,
            now_ns: 0,
        }
    }

    fn advance(&mut self, ns: u64) {
        self.now_ns += ns;
        if self.counter_configured[pins::FLOW_COUNTER_TIMER as usize] {
            self.count = self.window_pulses;
        }
        if self.overflow_enabled[pins::REVERSAL_TIMER as usize] && !self.irq_disabled {
            let period = u64::from(REVERSAL_PERIOD_MS) * NS_PER_MS;
            self.reversal_accum_ns += ns;
            while self.reversal_accum_ns >= period {
                self.reversal_accum_ns -= period;
                reversal::on_overflow(self);
                self.reversals += 1;
            }
        }
    }

    fn note_counter_op(&mut self) {
        if !self.irq_disabled {
            self.unguarded_counter_ops += 1;
        }
    }
}

impl DirectionOutputs for SimBoard {
    fn write_direction(&mut self, pin: Pin, high: bool) {
        self.levels[pin as usize] = high;
    }
}

/// Handle onto a shared [`SimBoard`].
#[derive(Clone)]
pub struct SimHal {
    board: Rc<RefCell<SimBoard>>,
}

impl Default for SimHal {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHal {
    pub fn new() -> Self {
        Self { board: Rc::new(RefCell::new(SimBoard::new())) }
    }

    // ── Stimulus ──────────────────────────────────────────────

    /// Drive a digital input.
    pub fn set_input(&self, pin: Pin, high: bool) {
        self.board.borrow_mut().levels[pin as usize] = high;
    }

    /// Set the raw value the ADC returns for `channel` (clamped to 10 bits).
    pub fn set_adc(&self, channel: AnalogChannel, raw: u16) {
        self.board.borrow_mut().adc[channel as usize] = raw.min(ADC_MAX);
    }

    /// Queue per-window pulse counts, consumed one per counting window.
    pub fn queue_pulse_windows(&self, counts: &[u16]) {
        self.board.borrow_mut().pulse_script.extend(counts.iter().copied());
    }

    /// Count returned once the queue is empty.
    pub fn set_steady_pulses(&self, count: u16) {
        self.board.borrow_mut().steady_pulses = count;
    }

    /// Advance virtual time without going through a HAL consumer.
    pub fn advance_ms(&self, ms: u32) {
        self.board.borrow_mut().advance(u64::from(ms) * NS_PER_MS);
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn mode(&self, pin: Pin) -> Option<PinMode> {
        self.board.borrow().modes[pin as usize]
    }

    /// Current level of a pin (output or injected input).
    pub fn level(&self, pin: Pin) -> bool {
        self.board.borrow().levels[pin as usize]
    }

    /// Foreground writes to `pin` since boot.  ISR writes are not counted.
    pub fn writes_to(&self, pin: Pin) -> u32 {
        self.board.borrow().writes[pin as usize]
    }

    pub fn overflow_enabled(&self, timer: TimerChannel) -> bool {
        self.board.borrow().overflow_enabled[timer as usize]
    }

    pub fn counter_configured(&self, timer: TimerChannel) -> bool {
        self.board.borrow().counter_configured[timer as usize]
    }

    /// Reversal ISR invocations on this board.
    pub fn reversals(&self) -> u32 {
        self.board.borrow().reversals
    }

    /// Counting windows opened so far.
    pub fn pulse_windows(&self) -> u32 {
        self.board.borrow().windows
    }

    /// Length of the most recently closed counting window.
    pub fn last_window_ms(&self) -> Option<u64> {
        self.board.borrow().last_window_ms
    }

    /// Counter configure/clear/read calls made with interrupts enabled.
    pub fn unguarded_counter_ops(&self) -> u32 {
        self.board.borrow().unguarded_counter_ops
    }

    pub fn interrupts_enabled(&self) -> bool {
        !self.board.borrow().irq_disabled
    }

    pub fn now_ms(&self) -> u64 {
        self.board.borrow().now_ns / NS_PER_MS
    }
}

impl DelayNs for SimHal {
    fn delay_ns(&mut self, ns: u32) {
        self.board.borrow_mut().advance(u64::from(ns));
    }
}

impl Hal for SimHal {
    fn pin_mode(&mut self, pin: Pin, mode: PinMode) {
        self.board.borrow_mut().modes[pin as usize] = Some(mode);
    }

    fn digital_write(&mut self, pin: Pin, high: bool) {
        let mut b = self.board.borrow_mut();
        b.levels[pin as usize] = high;
        b.writes[pin as usize] += 1;
    }

    fn digital_read(&mut self, pin: Pin) -> bool {
        self.board.borrow().levels[pin as usize]
    }

    fn analog_read(&mut self, channel: AnalogChannel) -> u16 {
        self.board.borrow().adc[channel as usize]
    }

    fn set_overflow_interrupt(&mut self, timer: TimerChannel, enabled: bool) {
        let mut b = self.board.borrow_mut();
        b.overflow_enabled[timer as usize] = enabled;
        if !enabled {
            b.reversal_accum_ns = 0;
        }
    }

    fn configure_pulse_counter(&mut self, timer: TimerChannel) {
        let mut b = self.board.borrow_mut();
        b.note_counter_op();
        b.counter_configured[timer as usize] = true;
    }

    fn clear_pulse_count(&mut self, _timer: TimerChannel) {
        let mut b = self.board.borrow_mut();
        b.note_counter_op();
        let steady = b.steady_pulses;
        b.window_pulses = b.pulse_script.pop_front().unwrap_or(steady);
        b.count = 0;
        b.window_start_ns = b.now_ns;
        b.windows += 1;
    }

    fn pulse_count(&mut self, _timer: TimerChannel) -> u16 {
        let mut b = self.board.borrow_mut();
        b.note_counter_op();
        b.last_window_ms = Some((b.now_ns - b.window_start_ns) / NS_PER_MS);
        b.count
    }

    fn disable_interrupts(&mut self) {
        self.board.borrow_mut().irq_disabled = true;
    }

    fn enable_interrupts(&mut self) {
        self.board.borrow_mut().irq_disabled = false;
    }
}
