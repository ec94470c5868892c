//! # axis-harness
//!
//! Acceptance-test harness for motor-record axes behind a process-variable
//! transport, with embedded-hal 1.0 timing.
//!
//! ## Features
//!
//! - **Typed addressing**: record fields and auxiliary controls are enums, never ad-hoc strings
//! - **Verified moves**: every move checks the deadband and the quiescent status fields
//! - **Position re-referencing**: set/use-mode redefinition that preserves the user offset
//! - **Synchronized moves**: defer-gate coordination with a bounded completion poll
//! - **Type-state safety**: deferred moves cannot skip or reorder phases
//! - **no_std compatible**: the core runs without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axis_harness::{load_config, test_complete, Harness, StdDelay};
//!
//! let config = load_config("harness.toml")?;
//! let settings = config.settings();
//! let axis = config.axis("p6k1")?;
//!
//! let mut harness = Harness::new(channel_access, StdDelay::new());
//! let failed = harness.move_to(&axis, 1.5, settings.timeout).is_err();
//!
//! std::process::ExitCode::from(test_complete(failed))
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): TOML loading, the simulator and `StdDelay`
//! - `tracing` (default): log through `tracing`
//! - `defmt`: log through `defmt` on embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod pv;
pub mod report;
pub mod sequence;
pub mod verify;

#[cfg(feature = "std")]
mod delay;
#[cfg(feature = "std")]
pub mod sim;

// Re-exports for ergonomic API
pub use config::{validate_config, HarnessConfig, Settings};
pub use error::{Error, FailureKind, MotionOutcome, Result};
pub use motion::{DrivePower, Harness, MoveRequest};
pub use pv::{Axis, AuxField, Completion, DeferGate, Field, PvAccess, TransportErrorKind};
pub use report::{test_complete, TestStatus};
pub use sequence::{SequenceReport, StepFailure};
pub use verify::within_deadband;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

#[cfg(feature = "std")]
pub use delay::StdDelay;
