//! Example: Synchronized moves through a defer gate.
//!
//! This example demonstrates how to:
//! - Hold a controller's defer gate while writing several targets
//! - Release the gate so every axis starts together
//! - Poll all done flags with a bounded budget
//!
//! The second axis moves more slowly, so completion waits for it.
//!
//! Run with: `cargo run --example deferred_moves`

use std::process::ExitCode;
use std::time::Duration;

use axis_harness::config::PollPolicy;
use axis_harness::sim::{SimController, SimMotor};
use axis_harness::{test_complete, Axis, DeferGate, Harness, MoveRequest, Result, StdDelay};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const X: &str = "BL99:Mot:P6K1";
const Y: &str = "BL99:Mot:P6K2";
const GATE: &str = "BL99:Mot:Controller1:Defer";

const TIMEOUT: Duration = Duration::from_secs(100);

fn run(harness: &mut Harness<SimController, StdDelay>) -> Result<()> {
    let x = Axis::new(X)?;
    let y = Axis::new(Y)?;
    let gate = DeferGate::new(GATE)?;
    let poll = PollPolicy::new(Duration::from_millis(50), 100);

    let rows = [[1.0, -1.0], [2.5, 0.5], [0.0, 0.0]];
    for [tx, ty] in rows {
        let requests = [MoveRequest::new(&x, tx), MoveRequest::new(&y, ty)];
        harness.deferred_move(&requests, &gate, TIMEOUT, &poll)?;
        info!("both axes at ({}, {})", tx, ty);
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut sim = SimController::new();
    sim.add_motor(X, SimMotor::new().with_deadband(0.01).with_move_polls(2));
    sim.add_motor(Y, SimMotor::new().with_deadband(0.01).with_move_polls(6));
    sim.add_defer_gate(GATE, &[X, Y]);

    let mut harness = Harness::new(sim, StdDelay::new());
    let outcome = run(&mut harness);
    if let Err(ref e) = outcome {
        error!("{}", e);
    }

    test_complete(outcome.is_err()).into()
}
