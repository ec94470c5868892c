//! Example: Re-referencing an axis without moving it.
//!
//! This example demonstrates how to:
//! - Redefine the position of an axis that carries a user offset
//! - Run a set-position sequence and stop at the first failing step
//! - Turn the outcome into a process exit code
//!
//! The simulated axis refuses dial positions below -1.0, so the fourth step
//! of the sequence fails on its limit-violation flag.
//!
//! Run with: `cargo run --example set_position`

use std::process::ExitCode;

use axis_harness::config::{SequenceConfig, Settings, StepKind};
use axis_harness::sim::{SimController, SimMotor};
use axis_harness::{test_complete, Axis, Field, Harness, StdDelay};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const AXIS: &str = "BL99:Mot:P6K1";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut sim = SimController::new();
    sim.add_motor(
        AXIS,
        SimMotor::new()
            .with_deadband(0.1)
            .with_offset(0.25)
            .with_dial_limits(-1.0, 5.0),
    );

    let settings = Settings::default();
    let axis = match Axis::new(AXIS) {
        Ok(axis) => axis,
        Err(e) => {
            error!("bad axis name: {}", e);
            return test_complete(true).into();
        }
    };
    let mut harness = Harness::new(sim, StdDelay::new());

    let sequence = match SequenceConfig::new(AXIS, StepKind::SetPosition, &[0.0, 1.0, 1.234, -1.1, 0.0]) {
        Ok(sequence) => sequence,
        Err(e) => {
            error!("bad sequence: {}", e);
            return test_complete(true).into();
        }
    };
    let report = harness.run_sequence(&axis, &sequence, &settings);

    let motor = harness.port().motor(AXIS);
    if let Some(motor) = motor {
        info!(
            "final readback {} (dial {}, offset {})",
            motor.readback(),
            motor.dial(),
            motor.field(Field::Off)
        );
    }
    info!("{}/{} steps passed", report.completed, report.total);

    test_complete(!report.passed()).into()
}
