//! Unit tests for configuration validation.

use axis_harness::config::{validate_config, HarnessConfig};
use axis_harness::error::{ConfigError, Error};

const AXES: &str = r#"
[axes.m1]
pv = "TST:M1"

[axes.m2]
pv = "TST:M2"

[gates.ctrl]
pv = "TST:Defer"
"#;

fn config(extra: &str) -> HarnessConfig {
    let toml_str = format!("{}\n{}", AXES, extra);
    toml::from_str(&toml_str).expect("Failed to parse TOML")
}

fn config_error(extra: &str) -> ConfigError {
    match validate_config(&config(extra)) {
        Err(Error::Config(e)) => e,
        other => panic!("expected config error, got {:?}", other),
    }
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let cfg = config(
        r#"
[sequences.scan]
axis = "m1"
positions = [0.0, 1.0]

[deferred.sync]
gate = "ctrl"
axes = ["m1", "m2"]
targets = [[0.0, 1.0]]
"#,
    );
    assert!(validate_config(&cfg).is_ok());
}

#[test]
fn test_zero_timeout_rejected() {
    let err = config_error("[timing]\ntimeout_secs = 0.0");
    assert!(matches!(err, ConfigError::InvalidTimeout(_)));
}

#[test]
fn test_zero_poll_interval_rejected() {
    let err = config_error("[timing]\npoll_interval_ms = 0");
    assert_eq!(err, ConfigError::InvalidPollInterval(0));
}

#[test]
fn test_zero_poll_attempts_rejected() {
    let err = config_error("[timing]\nmax_poll_attempts = 0");
    assert_eq!(err, ConfigError::InvalidPollAttempts(0));
}

#[test]
fn test_empty_pv_rejected() {
    let err = config_error("[axes.m3]\npv = \"\"");
    assert_eq!(err, ConfigError::EmptyPvName);
}

#[test]
fn test_negative_auto_power_delay_rejected() {
    let err = config_error(
        r#"
[axes.m3]
pv = "TST:M3"

[axes.m3.auto_power]
auto_enable = true
enable_delay = -1.0
"#,
    );
    assert!(matches!(err, ConfigError::InvalidDelay(_)));
}

/// Test validation fails for a sequence referencing a non-existent axis.
#[test]
fn test_sequence_invalid_axis_reference() {
    let err = config_error(
        r#"
[sequences.bad]
axis = "m9"
positions = [1.0]
"#,
    );
    match err {
        ConfigError::AxisNotFound(name) => assert_eq!(name.as_str(), "m9"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_empty_sequence_rejected() {
    let err = config_error(
        r#"
[sequences.empty]
axis = "m1"
positions = []
"#,
    );
    assert!(matches!(err, ConfigError::EmptySequence(_)));
}

#[test]
fn test_deferred_unknown_gate_rejected() {
    let err = config_error(
        r#"
[deferred.sync]
gate = "other"
axes = ["m1"]
targets = [[0.0]]
"#,
    );
    assert!(matches!(err, ConfigError::GateNotFound(_)));
}

#[test]
fn test_deferred_unknown_axis_rejected() {
    let err = config_error(
        r#"
[deferred.sync]
gate = "ctrl"
axes = ["m1", "m7"]
targets = [[0.0, 0.0]]
"#,
    );
    assert!(matches!(err, ConfigError::AxisNotFound(_)));
}

#[test]
fn test_deferred_without_axes_rejected() {
    let err = config_error(
        r#"
[deferred.sync]
gate = "ctrl"
axes = []
targets = [[]]
"#,
    );
    assert!(matches!(err, ConfigError::InvalidAxisCount { count: 0, .. }));
}

#[test]
fn test_deferred_row_length_mismatch() {
    let err = config_error(
        r#"
[deferred.sync]
gate = "ctrl"
axes = ["m1", "m2"]
targets = [[0.0, 1.0], [2.0]]
"#,
    );
    assert!(matches!(
        err,
        ConfigError::TargetCountMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Deferred sequence 'sync' has a row of 1 targets for 2 axes"
    );
}
