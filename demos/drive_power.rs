//! Example: Drive power and automatic power control.
//!
//! This example demonstrates how to:
//! - Switch a drive off and on and confirm the readback
//! - Configure automatic enable/disable around moves
//! - Set the controller's post-move delay
//!
//! Run with: `cargo run --example drive_power`

use std::process::ExitCode;
use std::time::Duration;

use axis_harness::config::AutoPower;
use axis_harness::sim::{SimController, SimMotor};
use axis_harness::{test_complete, Axis, DrivePower, Harness, Result, StdDelay};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const AXIS: &str = "BL99:Mot:P6K1";
const TIMEOUT: Duration = Duration::from_secs(10);

fn run(harness: &mut Harness<SimController, StdDelay>) -> Result<()> {
    let axis = Axis::new(AXIS)?;

    harness.set_drive_power(&axis, DrivePower::Disabled, TIMEOUT)?;
    harness.set_drive_power(&axis, DrivePower::Enabled, TIMEOUT)?;

    let auto = AutoPower::on().with_delays(0.5, 1.0);
    harness.configure_auto_power(&axis, &auto, TIMEOUT)?;
    harness.set_post_move_delay(&axis, 0.5, TIMEOUT)?;

    for target in [1.0, -1.0, 0.0] {
        harness.move_to(&axis, target, TIMEOUT)?;
        // Auto-disable switches the drive off once the move is done.
        harness.verify_drive_power(&axis, DrivePower::Disabled)?;
        info!("{} at {}, drive {:?}", AXIS, target, harness.drive_power(&axis)?);
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut sim = SimController::new();
    sim.add_motor(AXIS, SimMotor::new().with_deadband(0.01));

    let mut harness = Harness::new(sim, StdDelay::new());
    let outcome = run(&mut harness);
    if let Err(ref e) = outcome {
        error!("{}", e);
    }

    test_complete(outcome.is_err()).into()
}
