//! Post-move state validation.

use crate::error::{Result, VerifyError};
use crate::pv::{self, Axis, Field, PvAccess};

use super::deadband::{excursion, within_deadband};

/// A field and the value it must hold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Expectation {
    /// Field to read.
    pub field: Field,
    /// Required value.
    pub expected: f64,
}

impl Expectation {
    const fn new(field: Field, expected: f64) -> Self {
        Self { field, expected }
    }
}

/// Number of entries in [`QUIESCENT_STATE`].
pub const QUIESCENT_FIELDS: usize = 8;

/// Fields a settled axis must present, checked in this order.
pub const QUIESCENT_STATE: [Expectation; QUIESCENT_FIELDS] = [
    Expectation::new(Field::Dmov, 1.0),
    Expectation::new(Field::Movn, 0.0),
    Expectation::new(Field::Stat, 0.0),
    Expectation::new(Field::Sevr, 0.0),
    Expectation::new(Field::Lvio, 0.0),
    Expectation::new(Field::Miss, 0.0),
    Expectation::new(Field::Rhls, 0.0),
    Expectation::new(Field::Rlls, 0.0),
];

/// Every quiescent mismatch found on one axis.
pub type Survey = heapless::Vec<VerifyError, QUIESCENT_FIELDS>;

/// Check that `field` on `axis` equals `expected` exactly.
///
/// # Errors
///
/// Returns `QuiescentMismatch` on inequality, or a transport error if the
/// read fails.
pub fn verify_field<P>(port: &mut P, axis: &Axis, field: Field, expected: f64) -> Result<()>
where
    P: PvAccess + ?Sized,
{
    let pv = axis.field(field);
    let actual = pv::get(port, &pv)?;

    if actual != expected {
        warn!("{} is {}, expected {}", pv.as_str(), actual, expected);
        return Err(VerifyError::QuiescentMismatch {
            pv,
            field,
            expected,
            actual,
        }
        .into());
    }

    Ok(())
}

/// Check every entry of [`QUIESCENT_STATE`], stopping at the first mismatch.
///
/// # Errors
///
/// Returns the first failing field, or a transport error.
pub fn post_move_check<P>(port: &mut P, axis: &Axis) -> Result<()>
where
    P: PvAccess + ?Sized,
{
    for expectation in QUIESCENT_STATE.iter() {
        verify_field(port, axis, expectation.field, expectation.expected)?;
    }

    debug!("{} settled", axis.base());
    Ok(())
}

/// Read all of [`QUIESCENT_STATE`] and collect every mismatch.
///
/// Unlike [`post_move_check`], this does not stop at the first bad field.
///
/// # Errors
///
/// Returns a transport error if any read fails.
pub fn quiescent_survey<P>(port: &mut P, axis: &Axis) -> Result<Survey>
where
    P: PvAccess + ?Sized,
{
    let mut survey = Survey::new();

    for expectation in QUIESCENT_STATE.iter() {
        let pv = axis.field(expectation.field);
        let actual = pv::get(port, &pv)?;
        if actual != expectation.expected {
            // Survey capacity equals the table length.
            let _ = survey.push(VerifyError::QuiescentMismatch {
                pv,
                field: expectation.field,
                expected: expectation.expected,
                actual,
            });
        }
    }

    Ok(survey)
}

/// Check that the readback of `axis` is within its deadband of `expected`.
///
/// # Errors
///
/// Returns `DeadbandViolation` carrying expected, actual, and deadband, or a
/// transport error.
pub fn verify_position<P>(port: &mut P, axis: &Axis, expected: f64) -> Result<()>
where
    P: PvAccess + ?Sized,
{
    let deadband = pv::get(port, &axis.field(Field::Rdbd))?;
    let actual = pv::get(port, &axis.field(Field::Rbv))?;

    if !within_deadband(actual, expected, deadband) {
        error!(
            "{} readback {} outside {} +/- {} by {}",
            axis.base(),
            actual,
            expected,
            deadband,
            excursion(actual, expected, deadband)
        );
        return Err(VerifyError::DeadbandViolation {
            axis: axis.name().clone(),
            expected,
            actual,
            deadband,
        }
        .into());
    }

    Ok(())
}
