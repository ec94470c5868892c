//! Single-axis moves and position re-referencing.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::error::{FailureKind, MotionOutcome, Result};
use crate::pv::{self, Axis, Completion, Field, PvAccess, PvName};
use crate::verify::{self, Survey};

/// `.SET` value for set mode.
const SET_MODE: f64 = 1.0;
/// `.SET` value for use mode.
const USE_MODE: f64 = 0.0;

/// Test harness driving axes through a PV port.
///
/// Generic over:
/// - `P`: the PV transport (must implement [`PvAccess`])
/// - `D`: delay provider for poll intervals and settle pauses (must implement `DelayNs`)
///
/// The harness holds no timing state. Timeouts and poll bounds are passed
/// into every call, usually from [`Settings`](crate::config::Settings).
pub struct Harness<P, D>
where
    P: PvAccess,
    D: DelayNs,
{
    /// PV transport.
    port: P,

    /// Delay provider.
    delay: D,
}

impl<P, D> Harness<P, D>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Create a harness over a PV port and delay provider.
    pub fn new(port: P, delay: D) -> Self {
        Self { port, delay }
    }

    /// Get the PV port.
    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Get the PV port mutably.
    #[inline]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Get the delay provider.
    #[inline]
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Release the port and delay provider.
    pub fn into_parts(self) -> (P, D) {
        (self.port, self.delay)
    }

    /// Check that `field` on `axis` equals `expected` exactly.
    pub fn verify_field(&mut self, axis: &Axis, field: Field, expected: f64) -> MotionOutcome {
        verify::verify_field(&mut self.port, axis, field, expected)
    }

    /// Check every quiescent field, reporting the first mismatch.
    pub fn post_move_check(&mut self, axis: &Axis) -> MotionOutcome {
        verify::post_move_check(&mut self.port, axis)
    }

    /// Collect every quiescent mismatch on `axis`.
    pub fn quiescent_survey(&mut self, axis: &Axis) -> Result<Survey> {
        verify::quiescent_survey(&mut self.port, axis)
    }

    /// Check that the readback of `axis` is within its deadband of `expected`.
    pub fn verify_position(&mut self, axis: &Axis, expected: f64) -> MotionOutcome {
        verify::verify_position(&mut self.port, axis, expected)
    }

    /// Move `axis` to `target` and confirm it settled there.
    ///
    /// Blocks on the command write for at most `timeout`. Success requires the
    /// readback within the deadband and every quiescent field correct. A
    /// deadband violation is reported as such even when the follow-up
    /// diagnostics find further problems. No retries.
    ///
    /// # Errors
    ///
    /// - Transport error if the command write fails or times out; nothing is
    ///   validated in that case
    /// - `DeadbandViolation` if the readback is out of tolerance
    /// - `QuiescentMismatch` for the first status field out of place
    pub fn move_to(&mut self, axis: &Axis, target: f64, timeout: Duration) -> MotionOutcome {
        info!("{} move to {}", axis.base(), target);

        let val = axis.field(Field::Val);
        if let Err(e) = self.put(&val, target, Completion::Wait(timeout)) {
            error!("{} move to {} failed: {}", axis.base(), target, e);
            return Err(e);
        }

        match self.verify_position(axis, target) {
            Ok(()) => self.post_move_check(axis),
            Err(violation) if violation.kind() == FailureKind::DeadbandViolation => {
                self.report_diagnostics(axis);
                Err(violation)
            }
            Err(e) => Err(e),
        }
    }

    /// Redefine the current position of `axis` as `position` without moving.
    ///
    /// The offset is captured first and re-written before leaving set mode;
    /// the write order SET, DVAL, OFF, SET is required by the record. On
    /// success the readback equals `position + offset` within the deadband.
    ///
    /// # Errors
    ///
    /// - Transport error if any read or write fails
    /// - `QuiescentMismatch` if the axis is not settled afterwards
    /// - `DeadbandViolation` if the readback does not match
    pub fn set_position(&mut self, axis: &Axis, position: f64, timeout: Duration) -> MotionOutcome {
        let wait = Completion::Wait(timeout);
        let set = axis.field(Field::Set);

        let offset = self.get(&axis.field(Field::Off))?;
        info!("{} set position {} (offset {})", axis.base(), position, offset);

        self.put(&set, SET_MODE, wait)?;

        if let Err(e) = self.redefine(axis, position, offset, wait) {
            // Best effort: do not leave the record in set mode.
            if self.put(&set, USE_MODE, wait).is_err() {
                warn!("{} may still be in set mode", axis.base());
            }
            return Err(e);
        }

        self.put(&set, USE_MODE, wait)?;

        self.post_move_check(axis)?;
        self.verify_position(axis, position + offset)
    }

    fn redefine(&mut self, axis: &Axis, position: f64, offset: f64, wait: Completion) -> Result<()> {
        self.put(&axis.field(Field::Dval), position, wait)?;
        // The record may have shifted the offset while in set mode.
        self.put(&axis.field(Field::Off), offset, wait)
    }

    pub(crate) fn report_diagnostics(&mut self, axis: &Axis) {
        match self.quiescent_survey(axis) {
            Ok(survey) => {
                for mismatch in survey.iter() {
                    warn!("{} after failed move: {}", axis.base(), mismatch);
                }
            }
            Err(e) => warn!("{} post-move diagnostics unavailable: {}", axis.base(), e),
        }
    }

    pub(crate) fn get(&mut self, pv: &PvName) -> Result<f64> {
        pv::get(&mut self.port, pv)
    }

    pub(crate) fn put(&mut self, pv: &PvName, value: f64, completion: Completion) -> Result<()> {
        debug!("put {} = {} (wait: {})", pv.as_str(), value, completion.is_blocking());
        pv::put(&mut self.port, pv, value, completion)
    }

    /// Sleep for `duration` through the delay provider.
    ///
    /// Long pauses are split into whole-millisecond chunks so no part of the
    /// duration is dropped.
    pub(crate) fn pause(&mut self, duration: Duration) {
        let mut millis = duration.as_millis();
        while millis > 0 {
            let chunk = u32::try_from(millis).unwrap_or(u32::MAX);
            self.delay.delay_ms(chunk);
            millis -= u128::from(chunk);
        }

        let micros = duration.subsec_micros() % 1000;
        if micros > 0 {
            self.delay.delay_us(micros);
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::error::{Error, VerifyError};
    use crate::sim::{SimController, SimDelay, SimEvent, SimMotor};

    const M1: &str = "TEST:M1";
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn harness(motor: SimMotor) -> Harness<SimController, SimDelay> {
        let mut sim = SimController::new();
        sim.add_motor(M1, motor);
        Harness::new(sim, SimDelay::new())
    }

    #[test]
    fn test_move_reaches_target() {
        let mut h = harness(SimMotor::new().with_deadband(0.1));
        let axis = Axis::new(M1).unwrap();

        assert!(h.move_to(&axis, 3.0, TIMEOUT).is_ok());
        assert_eq!(h.port().motor(M1).unwrap().readback(), 3.0);
    }

    #[test]
    fn test_move_outside_deadband() {
        let mut h = harness(SimMotor::new().with_deadband(0.1).with_settle_error(0.2));
        let axis = Axis::new(M1).unwrap();

        let err = h.move_to(&axis, 1.0, TIMEOUT).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DeadbandViolation);
    }

    #[test]
    fn test_deadband_violation_wins_over_status_mismatch() {
        let mut motor = SimMotor::new().with_deadband(0.1).with_settle_error(0.5);
        motor.set_field(Field::Lvio, 1.0);
        let mut h = harness(motor);
        let axis = Axis::new(M1).unwrap();

        let err = h.move_to(&axis, 1.0, TIMEOUT).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DeadbandViolation);

        // Diagnostics still read the status fields.
        let lvio = axis.field(Field::Lvio);
        assert!(h
            .port()
            .journal()
            .iter()
            .any(|e| matches!(e, SimEvent::Read { pv } if pv.as_str() == lvio.as_str())));
    }

    #[test]
    fn test_failed_write_skips_validation() {
        let mut h = harness(SimMotor::new());
        let axis = Axis::new(M1).unwrap();
        h.port_mut()
            .fail_pv(axis.field(Field::Val).as_str(), crate::pv::TransportErrorKind::Timeout);

        let err = h.move_to(&axis, 1.0, TIMEOUT).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(h
            .port()
            .journal()
            .iter()
            .all(|e| !matches!(e, SimEvent::Read { .. })));
    }

    #[test]
    fn test_set_position_restores_offset() {
        let mut h = harness(SimMotor::new().with_deadband(0.1).with_offset(0.5));
        let axis = Axis::new(M1).unwrap();

        assert!(h.set_position(&axis, 2.0, TIMEOUT).is_ok());

        let motor = h.port().motor(M1).unwrap();
        assert_eq!(motor.field(Field::Off), 0.5);
        assert_eq!(motor.readback(), 2.5);
        assert_eq!(motor.field(Field::Set), 0.0);
    }

    #[test]
    fn test_set_position_leaves_set_mode_on_failure() {
        let mut h = harness(SimMotor::new());
        let axis = Axis::new(M1).unwrap();
        h.port_mut()
            .fail_pv(axis.field(Field::Dval).as_str(), crate::pv::TransportErrorKind::Rejected);

        let err = h.set_position(&axis, 1.0, TIMEOUT).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(h.port().motor(M1).unwrap().field(Field::Set), 0.0);
    }

    #[test]
    fn test_set_position_reports_unsettled_axis() {
        let mut motor = SimMotor::new();
        motor.set_field(Field::Miss, 1.0);
        let mut h = harness(motor);
        let axis = Axis::new(M1).unwrap();

        let err = h.set_position(&axis, 1.0, TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            Error::Verify(VerifyError::QuiescentMismatch {
                field: Field::Miss,
                ..
            })
        ));
    }

    #[test]
    fn test_long_pause_is_not_capped() {
        let mut h = harness(SimMotor::new());
        let long = Duration::from_millis(u64::from(u32::MAX) + 5_000);

        h.pause(long);
        assert_eq!(h.delay().elapsed(), long);
        assert_eq!(h.delay().calls(), 2);
    }

    #[test]
    fn test_pause_keeps_sub_millisecond_part() {
        let mut h = harness(SimMotor::new());

        h.pause(Duration::from_micros(2_500));
        assert_eq!(h.delay().elapsed(), Duration::from_micros(2_500));

        h.pause(Duration::ZERO);
        assert_eq!(h.delay().calls(), 2);
    }
}
