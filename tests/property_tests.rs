//! Property tests for the actuator interlocks and sensor conversions.
//!
//! Runs on host only; proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use dishwasher::actuators::{Actuator, ActuatorController, ActuatorState};
use dishwasher::hal::sim::SimHal;
use dishwasher::pins;
use dishwasher::sensors::{temperature, turbidity};
use dishwasher::Calibration;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    On(Actuator),
    Off(Actuator),
    MainOn,
    MainOff,
}

fn actuator() -> impl Strategy<Value = Actuator> {
    (0..Actuator::COUNT).prop_map(|i| Actuator::ALL[i])
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        actuator().prop_map(Op::On),
        actuator().prop_map(Op::Off),
        Just(Op::MainOn),
        Just(Op::MainOff),
    ]
}

fn apply(ctl: &mut ActuatorController<SimHal>, op: Op) {
    match op {
        Op::On(a) => {
            let _ = ctl.activate(a);
        }
        Op::Off(a) => ctl.deactivate(a),
        Op::MainOn => ctl.main_relay_on(),
        Op::MainOff => ctl.main_relay_off(),
    }
}

fn rig() -> (SimHal, ActuatorController<SimHal>) {
    let board = SimHal::new();
    let mut ctl = ActuatorController::new(board.clone());
    ctl.init_state();
    (board, ctl)
}

fn pins_match_cache(board: &SimHal, state: &ActuatorState) -> bool {
    Actuator::ALL.iter().all(|&a| board.level(a.pin()) == state.get(a))
}

// ── Interlocks ────────────────────────────────────────────────

proptest! {
    /// Refused activations touch neither the pin nor the cache, and the
    /// escape carries the lowest failing reason.
    #[test]
    fn refused_activation_is_side_effect_free(
        ops in proptest::collection::vec(op(), 0..24),
        target in actuator(),
    ) {
        let (board, mut ctl) = rig();
        for o in ops {
            apply(&mut ctl, o);
        }
        let before = ctl.state();
        let writes = board.writes_to(target.pin());
        let expected = target
            .preconditions()
            .iter()
            .filter(|p| !p.holds(&before))
            .map(|p| p.reason())
            .min();

        match ctl.activate(target) {
            Ok(()) => {
                prop_assert_eq!(expected, None);
                prop_assert!(ctl.is_on(target));
                prop_assert!(board.level(target.pin()));
            }
            Err(escape) => {
                prop_assert_eq!(Some(escape.reason), expected);
                prop_assert_eq!(escape.actuator, Some(target));
                prop_assert_eq!(ctl.state(), before);
                prop_assert_eq!(board.writes_to(target.pin()), writes);
            }
        }
    }

    /// The cache mirrors the pins and the reversal timer follows the
    /// diverter across any command sequence.
    #[test]
    fn cache_pins_and_reversal_stay_coherent(
        ops in proptest::collection::vec(op(), 0..48),
    ) {
        let (board, mut ctl) = rig();
        for o in ops {
            apply(&mut ctl, o);
            let s = ctl.state();
            prop_assert!(pins_match_cache(&board, &s));
            prop_assert_eq!(s.reversal_timer_armed, s.diverter);
            prop_assert_eq!(board.overflow_enabled(pins::REVERSAL_TIMER), s.diverter);
        }
    }

    /// Off commands are unconditional and idempotent.
    #[test]
    fn off_is_idempotent(
        ops in proptest::collection::vec(op(), 0..24),
        target in actuator(),
    ) {
        let (board, mut ctl) = rig();
        for o in ops {
            apply(&mut ctl, o);
        }
        ctl.deactivate(target);
        let once = ctl.state();
        ctl.deactivate(target);
        prop_assert_eq!(ctl.state(), once);
        prop_assert!(!ctl.is_on(target));
        prop_assert!(!board.level(target.pin()));
    }

    /// `on` then `off` restores the prior state with the target LOW; the
    /// diverter also disarms the reversal timer.
    #[test]
    fn on_then_off_restores_prior_state(
        ops in proptest::collection::vec(op(), 0..32),
        target in actuator(),
    ) {
        let (board, mut ctl) = rig();
        for o in ops {
            apply(&mut ctl, o);
        }
        let before = ctl.state();

        if ctl.activate(target).is_ok() {
            ctl.deactivate(target);

            let mut expected = before;
            match target {
                Actuator::MainRelay => expected.main_relay = false,
                Actuator::WashPump => expected.wash_pump = false,
                Actuator::Heater => expected.heater = false,
                Actuator::FillValve => expected.fill_valve = false,
                Actuator::RegenValve => expected.regen_valve = false,
                Actuator::Diverter => {
                    expected.diverter = false;
                    expected.reversal_timer_armed = false;
                }
                Actuator::DrainPump => expected.drain_pump = false,
                Actuator::DryerFan => expected.dryer_fan = false,
                Actuator::Dispenser => expected.dispenser = false,
            }
            prop_assert_eq!(ctl.state(), expected);
            prop_assert!(!board.level(target.pin()));
            prop_assert!(pins_match_cache(&board, &ctl.state()));
        } else {
            prop_assert_eq!(ctl.state(), before);
        }
    }

    /// init_state always lands on all-off with the timer disarmed.
    #[test]
    fn init_state_resets_everything(
        ops in proptest::collection::vec(op(), 0..48),
    ) {
        let (board, mut ctl) = rig();
        for o in ops {
            apply(&mut ctl, o);
        }
        ctl.init_state();
        prop_assert!(ctl.state().is_all_off());
        prop_assert_eq!(ctl.state(), ActuatorState::all_off());
        prop_assert!(!board.overflow_enabled(pins::REVERSAL_TIMER));
        for pin in pins::OUTPUT_PINS {
            prop_assert!(!board.level(pin));
        }
    }

    /// all_off never leaves a dependent running without its prerequisite.
    #[test]
    fn all_off_leaves_no_violations(
        ops in proptest::collection::vec(op(), 0..48),
    ) {
        let (_board, mut ctl) = rig();
        for o in ops {
            apply(&mut ctl, o);
        }
        ctl.all_off();
        prop_assert!(ctl.state().is_all_off());
        prop_assert!(ctl.state().violations().is_empty());
    }
}

// ── Sensor conversions ────────────────────────────────────────

proptest! {
    /// Classification is a pure function of the raw count and is
    /// monotonic: more light (higher voltage) never reads dirtier.
    #[test]
    fn turbidity_is_pure_and_monotonic(a in 0u16..=1023, b in 0u16..=1023) {
        let cal = Calibration::default();
        prop_assert_eq!(turbidity::classify(a, &cal), turbidity::classify(a, &cal));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let dirty_hi = turbidity::classify(hi, &cal).class.is_dirty();
        let dirty_lo = turbidity::classify(lo, &cal).class.is_dirty();
        prop_assert!(!dirty_hi || dirty_lo);
    }

    /// Temperature rises with the raw count.
    #[test]
    fn temperature_is_monotonic(a in 0u16..1023) {
        let cal = Calibration::default();
        let t0 = temperature::convert(a, &cal).celsius;
        let t1 = temperature::convert(a + 1, &cal).celsius;
        prop_assert!(t1 > t0);
    }
}
