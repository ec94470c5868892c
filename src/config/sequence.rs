//! Test sequence configuration from TOML.

use heapless::{String, Vec};
use serde::Deserialize;

use crate::error::{ConfigError, Result, MAX_DEFERRED_AXES};

use super::units::{Milliseconds, Seconds};

/// Maximum steps in one sequence.
pub const MAX_STEPS: usize = 128;

/// Maximum rows in one deferred sequence.
pub const MAX_DEFERRED_STEPS: usize = 32;

/// How each position of a sequence is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Physically move to the position.
    #[default]
    Move,
    /// Redefine the current position without moving.
    SetPosition,
}

/// Single-axis sequence under `[sequences.<name>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceConfig {
    /// Axis name (must match an axis in config).
    pub axis: String<32>,

    /// Move or set-position.
    #[serde(default)]
    pub kind: StepKind,

    /// Positions visited in order.
    pub positions: Vec<f64, MAX_STEPS>,

    /// Pause after each step.
    #[serde(default)]
    pub settle_ms: Milliseconds,

    /// Post-move delay written to the controller before the first step.
    #[serde(default)]
    pub post_move_delay: Option<Seconds>,
}

impl SequenceConfig {
    /// Build a sequence in code.
    ///
    /// # Errors
    ///
    /// Returns `NameTooLong` if `axis` does not fit an axis name, or
    /// `TooManySteps` if `positions` has more than [`MAX_STEPS`] entries.
    pub fn new(axis: &str, kind: StepKind, positions: &[f64]) -> Result<Self> {
        let axis = String::try_from(axis).map_err(|_| ConfigError::NameTooLong(axis.len()))?;
        let positions = Vec::from_slice(positions).map_err(|_| ConfigError::TooManySteps {
            count: positions.len(),
            max: MAX_STEPS,
        })?;

        Ok(Self {
            axis,
            kind,
            positions,
            settle_ms: Milliseconds::default(),
            post_move_delay: None,
        })
    }

    /// Set the pause after each step.
    pub fn with_settle(mut self, settle: Milliseconds) -> Self {
        self.settle_ms = settle;
        self
    }

    /// Set the post-move delay written before the first step.
    pub fn with_post_move_delay(mut self, delay: Seconds) -> Self {
        self.post_move_delay = Some(delay);
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the sequence has no steps.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Synchronized multi-axis sequence under `[deferred.<name>]`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeferredSequenceConfig {
    /// Gate name (must match a gate in config).
    pub gate: String<32>,

    /// Axis names, in the order targets are listed.
    pub axes: Vec<String<32>, MAX_DEFERRED_AXES>,

    /// One row of targets per step, one target per axis.
    pub targets: Vec<Vec<f64, MAX_DEFERRED_AXES>, MAX_DEFERRED_STEPS>,
}

impl DeferredSequenceConfig {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if the sequence has no steps.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
