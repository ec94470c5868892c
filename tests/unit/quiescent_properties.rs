//! Property tests for the quiescent-state checks.

use axis_harness::error::{Error, VerifyError};
use axis_harness::sim::{SimController, SimMotor};
use axis_harness::verify::QUIESCENT_STATE;
use axis_harness::{Axis, Harness};
use embedded_hal_mock::eh1::delay::NoopDelay;
use proptest::prelude::*;

const M1: &str = "TST:M1";

fn settled_harness(motor: SimMotor) -> Harness<SimController, NoopDelay> {
    let mut sim = SimController::new();
    sim.add_motor(M1, motor);
    Harness::new(sim, NoopDelay::new())
}

#[test]
fn settled_axis_passes() {
    let mut h = settled_harness(SimMotor::new());
    let axis = Axis::new(M1).unwrap();

    assert!(h.post_move_check(&axis).is_ok());
    assert!(h.quiescent_survey(&axis).unwrap().is_empty());
}

proptest! {
    /// Changing any single status field fails the check and names that field.
    #[test]
    fn single_mutation_is_reported(
        index in 0..QUIESCENT_STATE.len(),
        delta in prop_oneof![Just(1.0f64), Just(-1.0f64), 2.0f64..100.0],
    ) {
        let expectation = QUIESCENT_STATE[index];
        let mut motor = SimMotor::new();
        motor.set_field(expectation.field, expectation.expected + delta);
        let mut h = settled_harness(motor);
        let axis = Axis::new(M1).unwrap();

        let err = h.post_move_check(&axis).unwrap_err();
        match err {
            Error::Verify(VerifyError::QuiescentMismatch { field, expected, actual, .. }) => {
                prop_assert_eq!(field, expectation.field);
                prop_assert_eq!(expected, expectation.expected);
                prop_assert_eq!(actual, expectation.expected + delta);
            }
            other => prop_assert!(false, "unexpected error: {}", other),
        }

        let survey = h.quiescent_survey(&axis).unwrap();
        prop_assert_eq!(survey.len(), 1);
    }

    /// The survey finds every mutated field, not just the first.
    #[test]
    fn survey_reports_all_mutations(mask in 1u8..=255) {
        let mut motor = SimMotor::new();
        let mut mutated = 0;
        for (bit, expectation) in QUIESCENT_STATE.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                motor.set_field(expectation.field, expectation.expected + 1.0);
                mutated += 1;
            }
        }
        let mut h = settled_harness(motor);
        let axis = Axis::new(M1).unwrap();

        prop_assert!(h.post_move_check(&axis).is_err());
        prop_assert_eq!(h.quiescent_survey(&axis).unwrap().len(), mutated);
    }
}
