//! Pin assignments for the dishwasher controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Numbers are the board header pins; the target
//! HAL routes them to MCU pads.

/// Header pin number.
pub type Pin = u8;

// ---------------------------------------------------------------------------
// Power and pumps
// ---------------------------------------------------------------------------

/// Master power relay.
pub const MAIN_RELAY_PIN: Pin = 8;
/// Wash (recirculation) pump command.
pub const WASH_PUMP_PIN: Pin = 14;
/// Drain pump command.
pub const DRAIN_PUMP_PIN: Pin = 5;
/// Wash pump phase outputs.  Configured as outputs and held LOW.
pub const PUMP_PHASE_A_PIN: Pin = 9;
pub const PUMP_PHASE_B_PIN: Pin = 10;

// ---------------------------------------------------------------------------
// Heating, valves, dispenser, fan
// ---------------------------------------------------------------------------

pub const HEATER_PIN: Pin = 15;
/// Inlet solenoid.
pub const FILL_VALVE_PIN: Pin = 22;
/// Salt-regeneration solenoid.
pub const REGEN_VALVE_PIN: Pin = 24;
/// Detergent / rinse-aid dispenser solenoid.
pub const DISPENSER_PIN: Pin = 7;
/// Dry-cycle fan.
pub const DRYER_FAN_PIN: Pin = 6;

// ---------------------------------------------------------------------------
// Diverter
// ---------------------------------------------------------------------------

/// Diverter valve engage.
pub const DIVERTER_PIN: Pin = 4;
/// Diverter direction pair, owned by the reversal ISR, always complementary.
pub const DIVERTER_DIR_1_PIN: Pin = 12;
pub const DIVERTER_DIR_2_PIN: Pin = 13;

// ---------------------------------------------------------------------------
// Sensors: digital
// ---------------------------------------------------------------------------

/// Salt reservoir level switch. HIGH = salt present.
pub const SALT_LEVEL_PIN: Pin = 26;
/// Rinse-aid reservoir level switch. HIGH = rinse aid present.
pub const RINSE_AID_LEVEL_PIN: Pin = 28;

// ---------------------------------------------------------------------------
// Sensors: analog
// ---------------------------------------------------------------------------

/// Analog input channel (A0, A1, ...).
pub type AnalogChannel = u8;

/// Water thermistor (A0).
pub const THERMISTOR_ADC: AnalogChannel = 0;
/// Turbidity sensor (A1).
pub const TURBIDITY_ADC: AnalogChannel = 1;

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// Hardware timer channel number.
pub type TimerChannel = u8;

/// Timer whose overflow interrupt drives diverter reversal.
pub const REVERSAL_TIMER: TimerChannel = 3;
/// Timer clocked by the flow meter on its external-clock input.
pub const FLOW_COUNTER_TIMER: TimerChannel = 5;
/// External-clock input of [`FLOW_COUNTER_TIMER`].
pub const FLOW_PULSE_PIN: Pin = 47;

/// Diverter reversal period.  Fixed at build time.
pub const REVERSAL_PERIOD_MS: u32 = 4_000;

// ---------------------------------------------------------------------------
// Groupings used at boot
// ---------------------------------------------------------------------------

/// Every output driven by the actuator controller, in configuration order.
pub const OUTPUT_PINS: [Pin; 13] = [
    MAIN_RELAY_PIN,
    WASH_PUMP_PIN,
    HEATER_PIN,
    FILL_VALVE_PIN,
    REGEN_VALVE_PIN,
    DIVERTER_PIN,
    DRAIN_PUMP_PIN,
    DRYER_FAN_PIN,
    DISPENSER_PIN,
    PUMP_PHASE_A_PIN,
    PUMP_PHASE_B_PIN,
    DIVERTER_DIR_1_PIN,
    DIVERTER_DIR_2_PIN,
];

/// Every digital input sampled by the sensor interface.
pub const INPUT_PINS: [Pin; 3] = [SALT_LEVEL_PIN, RINSE_AID_LEVEL_PIN, FLOW_PULSE_PIN];
