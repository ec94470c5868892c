//! Configuration module for axis-harness.
//!
//! Provides types for loading and validating axis, gate, timing and sequence
//! configuration from TOML files (with `std` feature) or pre-parsed data.

mod axis;
mod harness;
#[cfg(feature = "std")]
mod loader;
mod sequence;
mod timing;
pub mod units;
mod validation;

pub use axis::{AutoPower, AxisConfig, GateConfig};
pub use harness::HarnessConfig;
pub use sequence::{
    DeferredSequenceConfig, SequenceConfig, StepKind, MAX_DEFERRED_STEPS, MAX_STEPS,
};
pub use timing::{PollPolicy, Settings, TimingConfig};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Milliseconds, Seconds};
