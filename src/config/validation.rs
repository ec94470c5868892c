//! Configuration validation.

use heapless::String;

use crate::error::{ConfigError, Error, Result, MAX_DEFERRED_AXES};
use crate::pv::{Axis, DeferGate};

use super::axis::AutoPower;
use super::{DeferredSequenceConfig, HarnessConfig, SequenceConfig, TimingConfig};

/// Validate a harness configuration.
///
/// Checks:
/// - Timeout, poll interval and poll attempts are positive
/// - Every axis and gate PV name is usable
/// - Auto-power delays are not negative
/// - Sequences reference existing axes and gates and have steps
/// - Deferred target rows match their axis lists
pub fn validate_config(config: &HarnessConfig) -> Result<()> {
    validate_timing(&config.timing)?;

    for (_, axis) in config.axes.iter() {
        Axis::new(axis.pv.as_str())?;
        if let Some(ref power) = axis.auto_power {
            validate_auto_power(power)?;
        }
    }

    for (_, gate) in config.gates.iter() {
        DeferGate::new(gate.pv.as_str())?;
    }

    for (name, seq) in config.sequences.iter() {
        validate_sequence(name.as_str(), seq, config)?;
    }

    for (name, seq) in config.deferred.iter() {
        validate_deferred(name.as_str(), seq, config)?;
    }

    Ok(())
}

fn validate_timing(timing: &TimingConfig) -> Result<()> {
    let timeout = timing.timeout.0;
    if timeout.is_nan() || timeout.is_infinite() || timeout <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidTimeout(timeout)));
    }

    if timing.poll_interval.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidPollInterval(
            timing.poll_interval.0,
        )));
    }

    if timing.max_poll_attempts == 0 {
        return Err(Error::Config(ConfigError::InvalidPollAttempts(
            timing.max_poll_attempts,
        )));
    }

    Ok(())
}

fn validate_auto_power(power: &AutoPower) -> Result<()> {
    for delay in [power.enable_delay, power.disable_delay].into_iter().flatten() {
        if delay.is_nan() || delay < 0.0 {
            return Err(Error::Config(ConfigError::InvalidDelay(delay)));
        }
    }
    Ok(())
}

fn validate_sequence(name: &str, seq: &SequenceConfig, config: &HarnessConfig) -> Result<()> {
    // Axis must exist
    if config.axis_config(seq.axis.as_str()).is_none() {
        return Err(Error::Config(ConfigError::AxisNotFound(seq.axis.clone())));
    }

    // Must have at least one step
    if seq.positions.is_empty() {
        return Err(Error::Config(ConfigError::EmptySequence(sequence_name(name))));
    }

    if let Some(delay) = seq.post_move_delay {
        if delay.0.is_nan() || delay.0 < 0.0 {
            return Err(Error::Config(ConfigError::InvalidDelay(delay.0)));
        }
    }

    Ok(())
}

fn validate_deferred(
    name: &str,
    seq: &DeferredSequenceConfig,
    config: &HarnessConfig,
) -> Result<()> {
    // Gate must exist
    if config.gate_config(seq.gate.as_str()).is_none() {
        return Err(Error::Config(ConfigError::GateNotFound(seq.gate.clone())));
    }

    if seq.axes.is_empty() || seq.axes.len() > MAX_DEFERRED_AXES {
        return Err(Error::Config(ConfigError::InvalidAxisCount {
            sequence: sequence_name(name),
            count: seq.axes.len(),
        }));
    }

    // Every listed axis must exist
    for axis in seq.axes.iter() {
        if config.axis_config(axis.as_str()).is_none() {
            return Err(Error::Config(ConfigError::AxisNotFound(axis.clone())));
        }
    }

    if seq.targets.is_empty() {
        return Err(Error::Config(ConfigError::EmptySequence(sequence_name(name))));
    }

    // One target per axis in every row
    for row in seq.targets.iter() {
        if row.len() != seq.axes.len() {
            return Err(Error::Config(ConfigError::TargetCountMismatch {
                sequence: sequence_name(name),
                expected: seq.axes.len(),
                found: row.len(),
            }));
        }
    }

    Ok(())
}

fn sequence_name(name: &str) -> String<32> {
    String::try_from(name).unwrap_or_default()
}
