//! Property tests for the deadband comparison.

use axis_harness::verify::{excursion, within_deadband};
use proptest::prelude::*;

proptest! {
    /// Both edges of the band pass.
    #[test]
    fn edges_are_inclusive(target in -1000.0f64..1000.0, deadband in 0.0f64..10.0) {
        prop_assert!(within_deadband(target + deadband, target, deadband));
        prop_assert!(within_deadband(target - deadband, target, deadband));
        prop_assert!(within_deadband(target, target, deadband));
    }

    /// Anything measurably past an edge fails.
    #[test]
    fn past_the_edge_is_excluded(
        target in -1000.0f64..1000.0,
        deadband in 0.0f64..10.0,
        epsilon in 1e-6f64..1.0,
    ) {
        prop_assert!(!within_deadband(target + deadband + epsilon, target, deadband));
        prop_assert!(!within_deadband(target - deadband - epsilon, target, deadband));
    }

    /// Excursion is zero exactly when the reading passes.
    #[test]
    fn excursion_agrees_with_comparison(
        measured in -1000.0f64..1000.0,
        target in -1000.0f64..1000.0,
        deadband in 0.0f64..10.0,
    ) {
        let beyond = excursion(measured, target, deadband);
        prop_assert!(beyond >= 0.0);
        if beyond > 1e-9 {
            prop_assert!(!within_deadband(measured, target, deadband));
        }
    }
}

#[test]
fn zero_deadband_requires_exact_match() {
    assert!(within_deadband(1.234, 1.234, 0.0));
    assert!(!within_deadband(1.2340001, 1.234, 0.0));
}
