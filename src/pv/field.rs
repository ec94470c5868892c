//! Closed set of motor record fields the harness touches.

use core::fmt;

/// Motor record field, addressed as `<base>.<FIELD>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Commanded position (user coordinates).
    Val,
    /// Readback position.
    Rbv,
    /// Retry deadband.
    Rdbd,
    /// Done-moving flag.
    Dmov,
    /// Moving flag.
    Movn,
    /// Alarm status.
    Stat,
    /// Alarm severity.
    Sevr,
    /// Limit violation.
    Lvio,
    /// Missed-move flag.
    Miss,
    /// High limit switch.
    Rhls,
    /// Low limit switch.
    Rlls,
    /// User offset.
    Off,
    /// Set/use mode.
    Set,
    /// Dial-coordinate target, used in set mode.
    Dval,
    /// Drive power enable.
    Cnen,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 15] = [
        Field::Val,
        Field::Rbv,
        Field::Rdbd,
        Field::Dmov,
        Field::Movn,
        Field::Stat,
        Field::Sevr,
        Field::Lvio,
        Field::Miss,
        Field::Rhls,
        Field::Rlls,
        Field::Off,
        Field::Set,
        Field::Dval,
        Field::Cnen,
    ];

    /// Record field suffix as it appears after the `.`.
    pub const fn suffix(self) -> &'static str {
        match self {
            Field::Val => "VAL",
            Field::Rbv => "RBV",
            Field::Rdbd => "RDBD",
            Field::Dmov => "DMOV",
            Field::Movn => "MOVN",
            Field::Stat => "STAT",
            Field::Sevr => "SEVR",
            Field::Lvio => "LVIO",
            Field::Miss => "MISS",
            Field::Rhls => "RHLS",
            Field::Rlls => "RLLS",
            Field::Off => "OFF",
            Field::Set => "SET",
            Field::Dval => "DVAL",
            Field::Cnen => "CNEN",
        }
    }

    /// Look a field up by its suffix.
    pub fn from_suffix(suffix: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.suffix() == suffix)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Auxiliary controller PV, addressed as `<base>:<NAME>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxField {
    /// Enable the drive automatically before a move.
    AutoEnable,
    /// Disable the drive automatically after a move.
    AutoDisable,
    /// Delay after auto-enable before motion starts.
    AutoEnableDelay,
    /// Delay after motion before auto-disable.
    AutoDisableDelay,
    /// Post-move settle delay in seconds.
    DelayTime,
}

impl AuxField {
    /// Every auxiliary control.
    pub const ALL: [AuxField; 5] = [
        AuxField::AutoEnable,
        AuxField::AutoDisable,
        AuxField::AutoEnableDelay,
        AuxField::AutoDisableDelay,
        AuxField::DelayTime,
    ];

    /// Look up an auxiliary control by its exact name.
    pub fn from_name(name: &str) -> Option<AuxField> {
        AuxField::ALL.iter().copied().find(|aux| aux.name() == name)
    }

    /// PV name suffix as it appears after the `:`.
    pub const fn name(self) -> &'static str {
        match self {
            AuxField::AutoEnable => "AutoEnable",
            AuxField::AutoDisable => "AutoDisable",
            AuxField::AutoEnableDelay => "AutoEnableDelay",
            AuxField::AutoDisableDelay => "AutoDisableDelay",
            AuxField::DelayTime => "DelayTime",
        }
    }
}

impl fmt::Display for AuxField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
