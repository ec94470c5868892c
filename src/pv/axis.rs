//! Typed PV addressing for motor axes and defer gates.

use core::fmt;

use crate::error::{ConfigError, Error, Result};

use super::field::{AuxField, Field};
use super::{AxisName, PvName, MAX_BASE_LEN};

/// One motor axis, identified by the base name of its motor record.
///
/// Nothing about the axis is cached; every value is re-read from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axis {
    base: AxisName,
}

impl Axis {
    /// Create an axis handle for the motor record at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is empty or longer than [`MAX_BASE_LEN`].
    pub fn new(base: &str) -> Result<Self> {
        Ok(Self {
            base: base_name(base)?,
        })
    }

    /// Base PV name of the record.
    #[inline]
    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    /// Base name as a bounded string, for error payloads.
    #[inline]
    pub(crate) fn name(&self) -> &AxisName {
        &self.base
    }

    /// Full PV name of a record field: `<base>.<FIELD>`.
    pub fn field(&self, field: Field) -> PvName {
        let mut pv = PvName::new();
        // Capacity covers the longest base plus any suffix.
        let _ = pv.push_str(self.base.as_str());
        let _ = pv.push('.');
        let _ = pv.push_str(field.suffix());
        pv
    }

    /// Full PV name of an auxiliary control: `<base>:<NAME>`.
    pub fn aux(&self, aux: AuxField) -> PvName {
        let mut pv = PvName::new();
        let _ = pv.push_str(self.base.as_str());
        let _ = pv.push(':');
        let _ = pv.push_str(aux.name());
        pv
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}

/// Controller-wide gate that buffers axis commands while held.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeferGate {
    pv: PvName,
}

impl DeferGate {
    /// Value that holds commands.
    pub const DEFER: f64 = 1.0;
    /// Value that releases held commands.
    pub const EXECUTE: f64 = 0.0;

    /// Create a gate handle for the full PV name `pv`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pv` is empty or does not fit a PV name.
    pub fn new(pv: &str) -> Result<Self> {
        if pv.is_empty() {
            return Err(Error::Config(ConfigError::EmptyPvName));
        }
        let pv = PvName::try_from(pv)
            .map_err(|_| Error::Config(ConfigError::PvNameTooLong(pv.len())))?;
        Ok(Self { pv })
    }

    /// Full PV name of the gate.
    #[inline]
    pub fn pv(&self) -> &PvName {
        &self.pv
    }
}

impl fmt::Display for DeferGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pv.as_str())
    }
}

fn base_name(base: &str) -> Result<AxisName> {
    if base.is_empty() {
        return Err(Error::Config(ConfigError::EmptyPvName));
    }
    if base.len() > MAX_BASE_LEN {
        return Err(Error::Config(ConfigError::PvNameTooLong(base.len())));
    }
    AxisName::try_from(base).map_err(|_| Error::Config(ConfigError::PvNameTooLong(base.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_addressing() {
        let axis = Axis::new("BL99:Mot:P6K1").unwrap();
        assert_eq!(axis.field(Field::Rbv).as_str(), "BL99:Mot:P6K1.RBV");
        assert_eq!(axis.field(Field::Dmov).as_str(), "BL99:Mot:P6K1.DMOV");
        assert_eq!(axis.aux(AuxField::AutoEnable).as_str(), "BL99:Mot:P6K1:AutoEnable");
    }

    #[test]
    fn test_longest_base_fits_every_name() {
        let base: heapless::String<MAX_BASE_LEN> =
            core::iter::repeat('m').take(MAX_BASE_LEN).collect();
        let axis = Axis::new(base.as_str()).unwrap();

        let pv = axis.aux(AuxField::AutoDisableDelay);
        assert!(pv.ends_with(":AutoDisableDelay"));
        assert_eq!(pv.len(), MAX_BASE_LEN + 1 + "AutoDisableDelay".len());
    }

    #[test]
    fn test_invalid_base_names() {
        assert!(matches!(
            Axis::new(""),
            Err(Error::Config(ConfigError::EmptyPvName))
        ));

        let long: heapless::String<80> = core::iter::repeat('x').take(65).collect();
        assert!(matches!(
            Axis::new(long.as_str()),
            Err(Error::Config(ConfigError::PvNameTooLong(65)))
        ));
    }

    #[test]
    fn test_defer_gate() {
        let gate = DeferGate::new("BL99:Mot:Controller1:Defer").unwrap();
        assert_eq!(gate.pv().as_str(), "BL99:Mot:Controller1:Defer");
        assert!(DeferGate::new("").is_err());
    }
}
