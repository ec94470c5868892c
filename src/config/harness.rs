//! Harness configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use crate::error::{ConfigError, Error, Result};
use crate::pv::{Axis, DeferGate};

use super::axis::{AxisConfig, GateConfig};
use super::sequence::{DeferredSequenceConfig, SequenceConfig};
use super::timing::{Settings, TimingConfig};

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarnessConfig {
    /// Timeouts and polling bounds.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Named axes.
    pub axes: FnvIndexMap<String<32>, AxisConfig, 8>,

    /// Named defer gates.
    #[serde(default)]
    pub gates: FnvIndexMap<String<32>, GateConfig, 4>,

    /// Named single-axis sequences.
    #[serde(default)]
    pub sequences: FnvIndexMap<String<32>, SequenceConfig, 16>,

    /// Named synchronized multi-axis sequences.
    #[serde(default)]
    pub deferred: FnvIndexMap<String<32>, DeferredSequenceConfig, 8>,
}

impl HarnessConfig {
    /// Runtime timing settings.
    pub fn settings(&self) -> Settings {
        self.timing.settings()
    }

    /// Get an axis configuration by name.
    pub fn axis_config(&self, name: &str) -> Option<&AxisConfig> {
        self.axes
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a gate configuration by name.
    pub fn gate_config(&self, name: &str) -> Option<&GateConfig> {
        self.gates
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a sequence by name.
    pub fn sequence(&self, name: &str) -> Option<&SequenceConfig> {
        self.sequences
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Get a deferred sequence by name.
    pub fn deferred_sequence(&self, name: &str) -> Option<&DeferredSequenceConfig> {
        self.deferred
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Build the handle for a named axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is not configured.
    pub fn axis(&self, name: &str) -> Result<Axis> {
        self.axis_config(name)
            .ok_or_else(|| {
                Error::Config(ConfigError::AxisNotFound(
                    String::try_from(name).unwrap_or_default(),
                ))
            })?
            .axis()
    }

    /// Build the handle for a named gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the gate is not configured.
    pub fn gate(&self, name: &str) -> Result<DeferGate> {
        self.gate_config(name)
            .ok_or_else(|| {
                Error::Config(ConfigError::GateNotFound(
                    String::try_from(name).unwrap_or_default(),
                ))
            })?
            .gate()
    }

    /// Get a sequence by name, with error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if no sequence has that name.
    pub fn sequence_or_error(&self, name: &str) -> Result<&SequenceConfig> {
        self.sequence(name).ok_or_else(|| {
            Error::Config(ConfigError::SequenceNotFound(
                String::try_from(name).unwrap_or_default(),
            ))
        })
    }

    /// Get a deferred sequence by name, with error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if no deferred sequence has that name.
    pub fn deferred_sequence_or_error(&self, name: &str) -> Result<&DeferredSequenceConfig> {
        self.deferred_sequence(name).ok_or_else(|| {
            Error::Config(ConfigError::SequenceNotFound(
                String::try_from(name).unwrap_or_default(),
            ))
        })
    }

    /// List all axis names.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(|s| s.as_str())
    }

    /// List all sequence names.
    pub fn sequence_names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(|s| s.as_str())
    }

    /// List all deferred sequence names.
    pub fn deferred_names(&self) -> impl Iterator<Item = &str> {
        self.deferred.keys().map(|s| s.as_str())
    }
}
