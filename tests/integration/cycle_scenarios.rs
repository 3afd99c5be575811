//! Cycle-level scenarios: a program body run through the recovery
//! trampoline, observed at the pins.

use super::mock_hw::{rig, take_recovered};

use dishwasher::actuators::Actuator;
use dishwasher::hal::sim::SimHal;
use dishwasher::pins;
use dishwasher::{ActuatorController, Flow, ReasonCode};

#[test]
fn cold_start_wash_pump_escapes_with_code_1() {
    let (board, mut ctl) = rig();

    let flow = ctl.guarded(|c| c.wash_pump_on());

    assert_eq!(flow, Flow::Recovered(ReasonCode::MainRelayOff));
    assert_eq!(take_recovered(), vec![ReasonCode::MainRelayOff]);
    assert!(!board.level(pins::WASH_PUMP_PIN));
    assert!(!ctl.is_on(Actuator::WashPump));
    let last = ctl.last_escape().copied();
    assert_eq!(last.map(|e| e.actuator), Some(Some(Actuator::WashPump)));
}

#[test]
fn warm_path_dryer_fan_refused_while_washing() {
    let (board, mut ctl) = rig();

    let flow = ctl.guarded(|c| {
        c.main_relay_on();
        c.wash_pump_on()?;
        c.heater_on()?;
        c.dryer_fan_on()?;
        Ok(())
    });

    assert_eq!(flow.reason(), Some(ReasonCode::WashPumpRunning));
    assert_eq!(take_recovered(), vec![ReasonCode::WashPumpRunning]);
    // The handler dropped every load.
    assert!(ctl.state().is_all_off());
    assert!(!board.level(pins::DRYER_FAN_PIN));
    assert!(!board.level(pins::HEATER_PIN));
    assert!(!board.level(pins::MAIN_RELAY_PIN));
}

#[test]
fn steps_before_the_escape_are_not_rolled_back_by_the_core() {
    let _ = take_recovered();
    let board = SimHal::new();
    let mut ctl = ActuatorController::new(board.clone());
    ctl.init_state();
    assert!(!ctl.recovery_registered());

    let flow = ctl.guarded(|c| {
        c.main_relay_on();
        c.wash_pump_on()?;
        c.dryer_fan_on()
    });

    assert_eq!(flow.reason(), Some(ReasonCode::WashPumpRunning));
    assert!(board.level(pins::MAIN_RELAY_PIN));
    assert!(board.level(pins::WASH_PUMP_PIN));
    assert!(!board.level(pins::DRYER_FAN_PIN));
    assert!(take_recovered().is_empty());
}

#[test]
fn diverter_lifecycle_toggles_direction_pins() {
    let (board, mut ctl) = rig();

    let flow = ctl.guarded(|c| {
        c.main_relay_on();
        c.wash_pump_on()?;
        c.diverter_on()
    });
    assert!(flow.is_completed());
    assert!(board.level(pins::DIVERTER_PIN));
    assert!(ctl.state().reversal_timer_armed);
    assert!(board.overflow_enabled(pins::REVERSAL_TIMER));

    let before = board.reversals();
    board.advance_ms(pins::REVERSAL_PERIOD_MS * 3);
    assert_eq!(board.reversals(), before + 3);
    assert_ne!(
        board.level(pins::DIVERTER_DIR_1_PIN),
        board.level(pins::DIVERTER_DIR_2_PIN),
        "direction outputs are always complementary"
    );

    ctl.diverter_off();
    assert!(!board.level(pins::DIVERTER_PIN));
    assert!(!ctl.state().reversal_timer_armed);
    assert!(!board.overflow_enabled(pins::REVERSAL_TIMER));

    let after = board.reversals();
    board.advance_ms(pins::REVERSAL_PERIOD_MS * 2);
    assert_eq!(board.reversals(), after, "no reversals once disarmed");
}

#[test]
fn caller_raised_phase_code_reaches_recovery() {
    let (_board, mut ctl) = rig();

    let flow = ctl.guarded(|c| {
        c.main_relay_on();
        c.error_management(ReasonCode::NONE)?;
        c.error_management(5)
    });

    assert_eq!(flow, Flow::Recovered(ReasonCode::Reserved5));
    assert_eq!(take_recovered(), vec![ReasonCode::Reserved5]);
    assert_eq!(ctl.last_escape().and_then(|e| e.actuator), None);
}

#[test]
fn full_wash_program_completes() {
    let (board, mut ctl) = rig();

    let flow = ctl.guarded(|c| {
        c.main_relay_on();
        c.fill_valve_on()?;
        c.fill_valve_off();
        c.wash_pump_on()?;
        c.heater_on()?;
        c.diverter_on()?;
        c.dispenser_on()?;
        c.dispenser_off();
        c.diverter_off();
        c.heater_off();
        c.wash_pump_off();
        c.drain_pump_on()?;
        c.drain_pump_off();
        c.dryer_fan_on()?;
        c.dryer_fan_off();
        c.main_relay_off();
        Ok(c.state())
    });

    let end = flow.completed();
    assert!(end.is_some_and(|s| s.is_all_off()));
    assert!(take_recovered().is_empty());
    for pin in pins::OUTPUT_PINS {
        assert!(!board.level(pin), "pin {pin} left HIGH");
    }
}

#[test]
fn reinitialising_recovers_from_any_state() {
    let (board, mut ctl) = rig();
    let _ = ctl.guarded(|c| {
        c.main_relay_on();
        c.wash_pump_on()?;
        c.diverter_on()?;
        c.regen_valve_on()
    });

    ctl.init_state();

    assert!(ctl.state().is_all_off());
    assert!(!board.overflow_enabled(pins::REVERSAL_TIMER));
    for pin in pins::OUTPUT_PINS {
        assert!(!board.level(pin));
    }
}
