//! Drive power and controller-side motion settings.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::config::AutoPower;
use crate::error::{MotionOutcome, Result};
use crate::pv::{Axis, AuxField, Completion, Field, PvAccess};

use super::controller::Harness;

/// Drive amplifier state, as held by `.CNEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrivePower {
    /// Amplifier on, closed loop.
    Enabled,
    /// Amplifier off.
    Disabled,
}

impl DrivePower {
    /// Value written to `.CNEN`.
    #[inline]
    pub const fn value(self) -> f64 {
        match self {
            DrivePower::Enabled => 1.0,
            DrivePower::Disabled => 0.0,
        }
    }

    /// Interpret a `.CNEN` readback. Any non-zero value counts as enabled.
    #[inline]
    pub fn from_value(value: f64) -> Self {
        if value == 0.0 {
            DrivePower::Disabled
        } else {
            DrivePower::Enabled
        }
    }
}

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

impl<P, D> Harness<P, D>
where
    P: PvAccess,
    D: DelayNs,
{
    /// Switch the drive of `axis` on or off and confirm the readback.
    ///
    /// # Errors
    ///
    /// - Transport error if the write or read-back fails
    /// - `QuiescentMismatch` on `.CNEN` if the drive did not follow
    pub fn set_drive_power(&mut self, axis: &Axis, power: DrivePower, timeout: Duration) -> MotionOutcome {
        info!("{} drive power {}", axis.base(), power.value());
        self.put(&axis.field(Field::Cnen), power.value(), Completion::Wait(timeout))?;
        self.verify_drive_power(axis, power)
    }

    /// Check the drive of `axis` is in the given state.
    pub fn verify_drive_power(&mut self, axis: &Axis, power: DrivePower) -> MotionOutcome {
        self.verify_field(axis, Field::Cnen, power.value())
    }

    /// Read the drive state of `axis`.
    pub fn drive_power(&mut self, axis: &Axis) -> Result<DrivePower> {
        let cnen = self.get(&axis.field(Field::Cnen))?;
        Ok(DrivePower::from_value(cnen))
    }

    /// Write the automatic drive-power controls of `axis`.
    ///
    /// Delays are written only when configured.
    pub fn configure_auto_power(&mut self, axis: &Axis, auto: &AutoPower, timeout: Duration) -> MotionOutcome {
        debug!(
            "{} auto power enable={} disable={}",
            axis.base(),
            auto.auto_enable,
            auto.auto_disable
        );

        self.write_aux(axis, AuxField::AutoEnable, flag(auto.auto_enable), timeout)?;
        self.write_aux(axis, AuxField::AutoDisable, flag(auto.auto_disable), timeout)?;

        if let Some(delay) = auto.enable_delay {
            self.write_aux(axis, AuxField::AutoEnableDelay, f64::from(delay), timeout)?;
        }
        if let Some(delay) = auto.disable_delay {
            self.write_aux(axis, AuxField::AutoDisableDelay, f64::from(delay), timeout)?;
        }
        Ok(())
    }

    /// Write the controller's post-move delay for `axis`, in seconds.
    pub fn set_post_move_delay(&mut self, axis: &Axis, seconds: f64, timeout: Duration) -> MotionOutcome {
        info!("{} post-move delay {}s", axis.base(), seconds);
        self.write_aux(axis, AuxField::DelayTime, seconds, timeout)
    }

    fn write_aux(&mut self, axis: &Axis, aux: AuxField, value: f64, timeout: Duration) -> MotionOutcome {
        self.put(&axis.aux(aux), value, Completion::Wait(timeout))
    }
}
