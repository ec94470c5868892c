//! Unit test harness for axis-harness.
//!
//! This module organizes unit tests for each component of the library.

mod config_parsing;
mod config_validation;
mod deadband_properties;
mod quiescent_properties;
