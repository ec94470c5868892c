//! Axis and defer-gate configuration from TOML.

use heapless::String;
use serde::Deserialize;

use crate::error::Result;
use crate::pv::{Axis, AxisName, DeferGate, PvName};

/// Axis entry under `[axes.<name>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Base PV name of the motor record.
    pub pv: AxisName,

    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String<64>>,

    /// Optional automatic drive-power settings to apply before testing.
    #[serde(default)]
    pub auto_power: Option<AutoPower>,
}

impl AxisConfig {
    /// Build the axis handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the PV name is empty.
    pub fn axis(&self) -> Result<Axis> {
        Axis::new(self.pv.as_str())
    }
}

/// Gate entry under `[gates.<name>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Full PV name of the defer gate.
    pub pv: PvName,
}

impl GateConfig {
    /// Build the gate handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the PV name is empty.
    pub fn gate(&self) -> Result<DeferGate> {
        DeferGate::new(self.pv.as_str())
    }
}

/// Automatic drive-power control.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct AutoPower {
    /// Enable the drive before each move.
    #[serde(default)]
    pub auto_enable: bool,

    /// Disable the drive after each move.
    #[serde(default)]
    pub auto_disable: bool,

    /// Delay between enabling and moving, in controller units.
    #[serde(default)]
    pub enable_delay: Option<f32>,

    /// Delay between stopping and disabling, in controller units.
    #[serde(default)]
    pub disable_delay: Option<f32>,
}

impl AutoPower {
    /// Both automatic enable and disable, with no delays.
    pub const fn on() -> Self {
        Self {
            auto_enable: true,
            auto_disable: true,
            enable_delay: None,
            disable_delay: None,
        }
    }

    /// Manual drive control.
    pub const fn off() -> Self {
        Self {
            auto_enable: false,
            auto_disable: false,
            enable_delay: None,
            disable_delay: None,
        }
    }

    /// Set both delays.
    pub fn with_delays(mut self, enable: f32, disable: f32) -> Self {
        self.enable_delay = Some(enable);
        self.disable_delay = Some(disable);
        self
    }
}
