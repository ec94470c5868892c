//! Error types for axis-harness.
//!
//! Every failure carries the PV or axis involved and, for verification
//! failures, the expected and actual values, so one log line is enough to
//! diagnose it.

use core::fmt;

use crate::pv::{AxisName, Field, PvName, TransportErrorKind};

/// Most axes a single deferred move coordinates.
pub const MAX_DEFERRED_AXES: usize = 8;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Outcome of a move, re-reference, or deferred move.
pub type MotionOutcome = Result<()>;

/// Unified error type for all harness operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A read or write at the PV boundary failed
    Transport(TransportFailure),
    /// The device reached a state other than the one required
    Verify(VerifyError),
    /// A coordinated multi-axis move failed
    Coordination(CoordinationError),
    /// Configuration parsing or validation error
    Config(ConfigError),
}

/// Coarse failure category, for callers that branch on what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureKind {
    /// Read or write failed or timed out.
    Transport,
    /// Position outside the deadband.
    DeadbandViolation,
    /// Status field differs from its settled value.
    QuiescentMismatch,
    /// Bounded wait exhausted.
    PollTimeout,
    /// Malformed deferred-move request.
    Coordination,
    /// Bad configuration.
    Config,
}

/// Direction of a failed PV access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    /// `read`
    Read,
    /// `write`
    Write,
}

/// Failed PV access.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportFailure {
    /// PV that was being accessed
    pub pv: PvName,
    /// Read or write
    pub access: Access,
    /// What the transport reported
    pub kind: TransportErrorKind,
}

/// Verification failures.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VerifyError {
    /// Readback outside `expected ± deadband`
    DeadbandViolation {
        /// Axis base name
        axis: AxisName,
        /// Requested position
        expected: f64,
        /// Readback position
        actual: f64,
        /// Deadband read from the record
        deadband: f64,
    },
    /// A field differs from the value it must hold
    QuiescentMismatch {
        /// Full PV name
        pv: PvName,
        /// Field that was checked
        field: Field,
        /// Required value
        expected: f64,
        /// Value read
        actual: f64,
    },
}

/// Deferred-move coordination errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoordinationError {
    /// Not every axis reported done within the poll budget
    PollTimeout {
        /// Polls performed
        attempts: u32,
        /// Axes still moving on the last poll
        pending: heapless::Vec<AxisName, MAX_DEFERRED_AXES>,
    },
    /// Request list was empty
    NoAxes,
    /// Request list exceeds [`MAX_DEFERRED_AXES`]
    TooManyAxes(usize),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// PV name is empty
    EmptyPvName,
    /// PV name exceeds the supported length
    PvNameTooLong(usize),
    /// Axis name not found in configuration
    AxisNotFound(heapless::String<32>),
    /// Gate name not found in configuration
    GateNotFound(heapless::String<32>),
    /// Sequence name not found in configuration
    SequenceNotFound(heapless::String<32>),
    /// Timeout must be > 0
    InvalidTimeout(f32),
    /// Poll interval must be > 0
    InvalidPollInterval(u32),
    /// Poll attempts must be >= 1
    InvalidPollAttempts(u32),
    /// Auto-power delay must be >= 0
    InvalidDelay(f32),
    /// Sequence has no steps
    EmptySequence(heapless::String<32>),
    /// Sequence has more steps than it can hold
    TooManySteps {
        /// Steps requested
        count: usize,
        /// Maximum steps
        max: usize,
    },
    /// Axis, gate or sequence name exceeds 32 bytes
    NameTooLong(usize),
    /// Deferred sequence lists no axes, or too many
    InvalidAxisCount {
        /// Sequence name
        sequence: heapless::String<32>,
        /// Number of axes listed
        count: usize,
    },
    /// Target row does not match the number of axes
    TargetCountMismatch {
        /// Sequence name
        sequence: heapless::String<32>,
        /// Number of axes
        expected: usize,
        /// Number of targets in the row
        found: usize,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl Error {
    /// Failure category.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Transport(_) => FailureKind::Transport,
            Error::Verify(VerifyError::DeadbandViolation { .. }) => FailureKind::DeadbandViolation,
            Error::Verify(VerifyError::QuiescentMismatch { .. }) => FailureKind::QuiescentMismatch,
            Error::Coordination(CoordinationError::PollTimeout { .. }) => FailureKind::PollTimeout,
            Error::Coordination(_) => FailureKind::Coordination,
            Error::Config(_) => FailureKind::Config,
        }
    }

    pub(crate) fn read(pv: &PvName, kind: TransportErrorKind) -> Self {
        Error::Transport(TransportFailure {
            pv: pv.clone(),
            access: Access::Read,
            kind,
        })
    }

    pub(crate) fn write(pv: &PvName, kind: TransportErrorKind) -> Self {
        Error::Transport(TransportFailure {
            pv: pv.clone(),
            access: Access::Write,
            kind,
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "Transport error: {}", e),
            Error::Verify(e) => write!(f, "Verification failed: {}", e),
            Error::Coordination(e) => write!(f, "Coordination error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.access {
            Access::Read => "read",
            Access::Write => "write",
        };
        write!(f, "{} of {} {}", op, self.pv, self.kind)
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::DeadbandViolation {
                axis,
                expected,
                actual,
                deadband,
            } => write!(
                f,
                "{} readback {} outside {} +/- {}",
                axis, actual, expected, deadband
            ),
            VerifyError::QuiescentMismatch {
                pv,
                expected,
                actual,
                ..
            } => write!(f, "{} is {}, expected {}", pv, actual, expected),
        }
    }
}

impl fmt::Display for CoordinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinationError::PollTimeout { attempts, pending } => {
                write!(f, "moves did not complete after {} polls, still moving:", attempts)?;
                for axis in pending {
                    write!(f, " {}", axis)?;
                }
                Ok(())
            }
            CoordinationError::NoAxes => write!(f, "deferred move requested with no axes"),
            CoordinationError::TooManyAxes(n) => {
                write!(f, "deferred move of {} axes exceeds maximum {}", n, MAX_DEFERRED_AXES)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::EmptyPvName => write!(f, "PV name is empty"),
            ConfigError::PvNameTooLong(len) => {
                write!(f, "PV name of {} bytes exceeds maximum length", len)
            }
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' not found", name),
            ConfigError::GateNotFound(name) => write!(f, "Gate '{}' not found", name),
            ConfigError::SequenceNotFound(name) => write!(f, "Sequence '{}' not found", name),
            ConfigError::InvalidTimeout(v) => write!(f, "Invalid timeout: {}s. Must be > 0", v),
            ConfigError::InvalidPollInterval(v) => {
                write!(f, "Invalid poll interval: {}ms. Must be > 0", v)
            }
            ConfigError::InvalidPollAttempts(v) => {
                write!(f, "Invalid poll attempts: {}. Must be >= 1", v)
            }
            ConfigError::InvalidDelay(v) => write!(f, "Invalid delay: {}. Must be >= 0", v),
            ConfigError::EmptySequence(name) => write!(f, "Sequence '{}' has no steps", name),
            ConfigError::TooManySteps { count, max } => {
                write!(f, "Sequence of {} steps exceeds maximum {}", count, max)
            }
            ConfigError::NameTooLong(len) => {
                write!(f, "Name of {} bytes exceeds maximum length 32", len)
            }
            ConfigError::InvalidAxisCount { sequence, count } => write!(
                f,
                "Deferred sequence '{}' lists {} axes, must be 1-{}",
                sequence, count, MAX_DEFERRED_AXES
            ),
            ConfigError::TargetCountMismatch {
                sequence,
                expected,
                found,
            } => write!(
                f,
                "Deferred sequence '{}' has a row of {} targets for {} axes",
                sequence, found, expected
            ),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<TransportFailure> for Error {
    fn from(e: TransportFailure) -> Self {
        Error::Transport(e)
    }
}

impl From<VerifyError> for Error {
    fn from(e: VerifyError) -> Self {
        Error::Verify(e)
    }
}

impl From<CoordinationError> for Error {
    fn from(e: CoordinationError) -> Self {
        Error::Coordination(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for TransportFailure {}

#[cfg(feature = "std")]
impl std::error::Error for VerifyError {}

#[cfg(feature = "std")]
impl std::error::Error for CoordinationError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
