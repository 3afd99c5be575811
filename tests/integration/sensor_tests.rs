//! Sensor interface against scripted board inputs.

use dishwasher::hal::sim::SimHal;
use dishwasher::pins;
use dishwasher::sensors::turbidity::Turbidity;
use dishwasher::{Calibration, SensorInterface};

fn sensors() -> (SimHal, SensorInterface<SimHal>) {
    let board = SimHal::new();
    let s = SensorInterface::new(board.clone(), Calibration::default());
    (board, s)
}

#[test]
fn temperature_at_614_counts_is_about_twenty_degrees() {
    let (board, mut s) = sensors();
    board.set_adc(pins::THERMISTOR_ADC, 614);

    let r = s.read_temperature();
    assert_eq!(r.raw, 614);
    assert!((r.volts - 2.998).abs() < 0.001);
    assert!((r.celsius - 19.92).abs() < 0.01, "got {}", r.celsius);
    assert!((s.measure_temperature() - r.celsius).abs() < f32::EPSILON);
}

#[test]
fn turbidity_at_410_counts_is_dirty() {
    let (board, mut s) = sensors();
    board.set_adc(pins::TURBIDITY_ADC, 410);

    let r = s.read_turbidity();
    assert!((r.ntu - 2498.0).abs() < 1.0, "got {}", r.ntu);
    assert_eq!(s.measure_turbidity(), Turbidity::Dirty);
    assert_eq!(s.measure_turbidity().value(), 1);
}

#[test]
fn clear_water_is_clean() {
    let (board, mut s) = sensors();
    board.set_adc(pins::TURBIDITY_ADC, 900);
    assert_eq!(s.measure_turbidity(), Turbidity::Clean);
    assert_eq!(s.measure_turbidity().value(), -1);
}

#[test]
fn flow_discards_start_up_window() {
    let (board, mut s) = sensors();
    board.queue_pulse_windows(&[100, 200, 205, 210]);

    let r = s.read_flow();
    assert_eq!(r.discarded, 1);
    assert_eq!(r.counts, [200, 205, 210]);
    assert!((r.litres_per_sec - 0.1025).abs() < 1e-6);
    assert_eq!(board.pulse_windows(), 4);
    assert_eq!(board.unguarded_counter_ops(), 0);
}

#[test]
fn flow_waits_out_a_long_pulsating_start() {
    let (board, mut s) = sensors();
    let mut script: Vec<u16> = [10, 100].repeat(10);
    script.extend([200, 200, 200]);
    board.queue_pulse_windows(&script);

    let r = s.read_flow();
    assert_eq!(r.counts, [200, 200, 200]);
    assert_eq!(r.discarded, 20);
    assert!((r.litres_per_sec - 0.1).abs() < 1e-6);
}

#[test]
fn steady_flow_takes_three_windows() {
    let (board, mut s) = sensors();
    board.set_steady_pulses(300);

    let lps = s.measure_flow();
    // 2·900/3 = 600 pulses.
    assert!((lps - 600.0 * 0.000_25).abs() < 1e-6);
    assert_eq!(board.pulse_windows(), 3);
    assert_eq!(board.now_ms(), 1500);
}

#[test]
fn reservoir_levels_are_cached_between_reads() {
    let (board, mut s) = sensors();
    board.set_input(pins::SALT_LEVEL_PIN, true);

    assert!(s.read_salt_level());
    assert!(!s.read_rinse_aid_level());

    board.set_input(pins::SALT_LEVEL_PIN, false);
    board.set_input(pins::RINSE_AID_LEVEL_PIN, true);
    assert!(s.salt_level());
    assert!(!s.rinse_aid_level());

    let snap = s.read_all();
    assert!(!snap.salt_present);
    assert!(snap.rinse_aid_present);
}

#[test]
fn sensors_and_actuators_share_one_board() {
    let board = SimHal::new();
    let mut ctl = dishwasher::ActuatorController::new(board.clone());
    let mut s = SensorInterface::new(board.clone(), Calibration::default());
    ctl.init_state();
    board.set_adc(pins::THERMISTOR_ADC, 614);

    ctl.main_relay_on();
    assert!(board.level(pins::MAIN_RELAY_PIN));
    assert!(s.measure_temperature() > 19.0);
}
