//! Deadband comparison.

/// Check whether `measured` lies within `target ± deadband`.
///
/// Both bounds are inclusive. A NaN on either side never passes.
#[inline]
pub fn within_deadband(measured: f64, target: f64, deadband: f64) -> bool {
    measured >= target - deadband && measured <= target + deadband
}

/// Distance from `target` beyond the deadband edge, or zero inside it.
#[inline]
pub fn excursion(measured: f64, target: f64, deadband: f64) -> f64 {
    let distance = libm::fabs(measured - target);
    if distance > deadband {
        distance - deadband
    } else {
        0.0
    }
}
