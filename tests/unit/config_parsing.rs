//! Unit tests for TOML configuration parsing.

use std::time::Duration;

use axis_harness::config::{load_config, parse_config, AutoPower, HarnessConfig, Seconds, StepKind};

const FULL_CONFIG: &str = r#"
[timing]
timeout_secs = 30.0
poll_interval_ms = 250
max_poll_attempts = 40

[axes.p6k1]
pv = "BL99:Mot:P6K1"
description = "Sample X"

[axes.p6k1.auto_power]
auto_enable = true
auto_disable = true
enable_delay = 0.5
disable_delay = 2.0

[axes.p6k2]
pv = "BL99:Mot:P6K2"

[gates.controller1]
pv = "BL99:Mot:Controller1:Defer"

[sequences.set_position]
axis = "p6k1"
kind = "set_position"
positions = [0.0, 1.0, 1.234, -1.1, 0.0]

[sequences.scan]
axis = "p6k2"
positions = [-1.0, 1.0]
settle_ms = 500
post_move_delay = 0.25

[deferred.sync]
gate = "controller1"
axes = ["p6k1", "p6k2"]
targets = [[0.0, 1.0], [1.0, 2.0]]
"#;

/// Test parsing every table of a complete configuration.
#[test]
fn test_parse_full_config() {
    let config = parse_config(FULL_CONFIG).expect("Failed to parse config");

    let settings = config.settings();
    assert_eq!(settings.timeout, Duration::from_secs(30));
    assert_eq!(settings.poll.interval, Duration::from_millis(250));
    assert_eq!(settings.poll.max_attempts, 40);

    let names: Vec<&str> = config.axis_names().collect();
    assert_eq!(names, ["p6k1", "p6k2"]);

    let p6k1 = config.axis_config("p6k1").expect("Axis not found");
    assert_eq!(p6k1.pv.as_str(), "BL99:Mot:P6K1");
    assert_eq!(p6k1.description.as_deref(), Some("Sample X"));
    assert_eq!(
        p6k1.auto_power,
        Some(AutoPower::on().with_delays(0.5, 2.0))
    );
    assert!(config.axis_config("p6k2").unwrap().auto_power.is_none());

    let gate = config.gate("controller1").expect("Gate not found");
    assert_eq!(gate.pv().as_str(), "BL99:Mot:Controller1:Defer");
}

/// Test sequence defaults and explicit step settings.
#[test]
fn test_parse_sequences() {
    let config = parse_config(FULL_CONFIG).unwrap();

    let set = config.sequence("set_position").expect("Sequence not found");
    assert_eq!(set.kind, StepKind::SetPosition);
    assert_eq!(set.positions.as_slice(), &[0.0, 1.0, 1.234, -1.1, 0.0]);
    assert_eq!(set.settle_ms.value(), 0);
    assert!(set.post_move_delay.is_none());

    let scan = config.sequence("scan").unwrap();
    assert_eq!(scan.kind, StepKind::Move);
    assert_eq!(scan.settle_ms.to_duration(), Duration::from_millis(500));
    assert_eq!(scan.post_move_delay, Some(Seconds(0.25)));

    let sync = config.deferred_sequence("sync").expect("Deferred sequence not found");
    assert_eq!(sync.len(), 2);
    assert_eq!(sync.axes[1].as_str(), "p6k2");
    assert_eq!(sync.targets[1].as_slice(), &[1.0, 2.0]);

    assert_eq!(config.sequence_names().count(), 2);
    assert_eq!(config.deferred_names().collect::<Vec<_>>(), ["sync"]);
}

/// Test that omitted tables fall back to defaults.
#[test]
fn test_parse_defaults() {
    let config: HarnessConfig = toml::from_str(
        r#"
[axes.m1]
pv = "TST:M1"
"#,
    )
    .expect("Failed to parse TOML");

    let settings = config.settings();
    assert_eq!(settings.timeout, Duration::from_secs(100));
    assert_eq!(settings.poll.interval, Duration::from_millis(100));
    assert_eq!(settings.poll.max_attempts, 1000);
    assert!(config.gates.is_empty());
    assert!(config.sequences.is_empty());
}

/// Test that named lookups report what was missing.
#[test]
fn test_lookup_errors() {
    let config = parse_config(FULL_CONFIG).unwrap();

    let err = config.axis("nope").unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: Axis 'nope' not found");

    assert!(config.gate("nope").is_err());
    assert!(config.sequence_or_error("nope").is_err());
    assert!(config.deferred_sequence_or_error("scan").is_err());
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("axis-harness-{}.toml", std::process::id()));
    std::fs::write(&path, FULL_CONFIG).expect("Failed to write config");

    let config = load_config(&path);
    let _ = std::fs::remove_file(&path);

    let config = config.expect("Failed to load config");
    assert!(config.sequence("scan").is_some());
}

/// Test that a malformed file surfaces a parse error.
#[test]
fn test_parse_unknown_step_kind() {
    let result = parse_config(
        r#"
[axes.m1]
pv = "TST:M1"

[sequences.bad]
axis = "m1"
kind = "teleport"
positions = [1.0]
"#,
    );
    assert!(result.is_err());
}
