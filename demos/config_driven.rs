//! Example: Configuration-driven acceptance run.
//!
//! This example demonstrates how to:
//! - Load axes, gates, timing and sequences from TOML
//! - Apply per-axis automatic power settings
//! - Run every configured sequence and report one overall status
//!
//! Pass a path to use your own file; `demos/harness.toml` is the default.
//!
//! Run with: `cargo run --example config_driven [-- path/to/harness.toml]`

use std::path::PathBuf;
use std::process::ExitCode;

use axis_harness::sim::{SimController, SimMotor};
use axis_harness::{load_config, test_complete, Axis, HarnessConfig, Harness, Result, SequenceReport, StdDelay};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Build a simulated controller holding every configured axis and gate.
fn simulate(config: &HarnessConfig) -> SimController {
    let mut sim = SimController::new();
    for (_, axis) in config.axes.iter() {
        sim.add_motor(axis.pv.as_str(), SimMotor::new().with_deadband(0.01).with_move_polls(3));
    }

    for (name, gate) in config.gates.iter() {
        // A gate holds every axis that a deferred sequence pairs with it.
        let members: Vec<&str> = config
            .deferred
            .values()
            .filter(|seq| seq.gate == *name)
            .flat_map(|seq| seq.axes.iter())
            .filter_map(|axis| config.axis_config(axis.as_str()))
            .map(|axis| axis.pv.as_str())
            .collect();
        sim.add_defer_gate(gate.pv.as_str(), &members);
    }
    sim
}

fn summarize(name: &str, report: &SequenceReport) -> bool {
    match &report.failure {
        None => info!("{}: {}/{} steps passed", name, report.completed, report.total),
        Some(failure) => warn!(
            "{}: stopped at step {:?} after {}/{}: {}",
            name, failure.index, report.completed, report.total, failure.error
        ),
    }
    report.passed()
}

fn run(config: &HarnessConfig, harness: &mut Harness<SimController, StdDelay>) -> Result<bool> {
    let settings = config.settings();
    let mut passed = true;

    for (name, axis_config) in config.axes.iter() {
        if let Some(ref auto) = axis_config.auto_power {
            info!("{}: applying auto power", name);
            harness.configure_auto_power(&axis_config.axis()?, auto, settings.timeout)?;
        }
    }

    for name in config.sequence_names() {
        let sequence = config.sequence_or_error(name)?;
        let axis = config.axis(sequence.axis.as_str())?;
        let report = harness.run_sequence(&axis, sequence, &settings);
        passed &= summarize(name, &report);
    }

    for name in config.deferred_names() {
        let sequence = config.deferred_sequence_or_error(name)?;
        let gate = config.gate(sequence.gate.as_str())?;
        let axes = sequence
            .axes
            .iter()
            .map(|axis| config.axis(axis.as_str()))
            .collect::<Result<Vec<Axis>>>()?;
        let report = harness.run_deferred_sequence(name, &axes, &gate, sequence, &settings);
        passed &= summarize(name, &report);
    }

    Ok(passed)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/harness.toml"));

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}: {}", path.display(), e);
            return test_complete(true).into();
        }
    };
    info!(
        "loaded {} axes, {} sequences, {} deferred sequences from {}",
        config.axes.len(),
        config.sequences.len(),
        config.deferred.len(),
        path.display()
    );

    let mut harness = Harness::new(simulate(&config), StdDelay::new());
    let failed = match run(&config, &mut harness) {
        Ok(passed) => !passed,
        Err(e) => {
            error!("{}", e);
            true
        }
    };

    test_complete(failed).into()
}
