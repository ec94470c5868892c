//! Blocking read/write port against named process variables.
//!
//! The transport (Channel Access, pvAccess, a simulator) lives outside this
//! crate and is plugged in by implementing [`PvAccess`]. Error handling follows
//! the embedded-hal convention: the implementation chooses its own error type
//! and maps it onto a [`TransportErrorKind`].

use core::fmt;
use core::time::Duration;

/// How a write waits for the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Block until the device acknowledges completion or the timeout elapses.
    Wait(Duration),
    /// Return as soon as the transport accepts the request.
    NoWait,
}

impl Completion {
    /// Whether the write blocks until completion.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Completion::Wait(_))
    }
}

/// Transport failure categories the harness distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum TransportErrorKind {
    /// The device did not acknowledge within the timeout.
    Timeout,
    /// The PV could not be reached.
    Disconnected,
    /// The device refused the value.
    Rejected,
    /// Anything the transport cannot classify.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Timeout => write!(f, "timed out"),
            TransportErrorKind::Disconnected => write!(f, "disconnected"),
            TransportErrorKind::Rejected => write!(f, "rejected"),
            TransportErrorKind::Other => write!(f, "transport failure"),
        }
    }
}

/// Transport error trait.
pub trait Error: fmt::Debug {
    /// Convert the transport error into a generic kind.
    fn kind(&self) -> TransportErrorKind;
}

impl Error for TransportErrorKind {
    #[inline]
    fn kind(&self) -> TransportErrorKind {
        *self
    }
}

impl Error for core::convert::Infallible {
    fn kind(&self) -> TransportErrorKind {
        match *self {}
    }
}

/// Error type trait for PV ports.
pub trait ErrorType {
    /// Error type
    type Error: Error;
}

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

/// Synchronous access to named process variables.
pub trait PvAccess: ErrorType {
    /// Read the current value of `pv`.
    fn read(&mut self, pv: &str) -> Result<f64, Self::Error>;

    /// Write `value` to `pv`.
    ///
    /// With [`Completion::Wait`] the call must not return `Ok` before the
    /// device has acknowledged; an elapsed timeout is an error.
    fn write(&mut self, pv: &str, value: f64, completion: Completion) -> Result<(), Self::Error>;
}

impl<T: PvAccess + ?Sized> PvAccess for &mut T {
    #[inline]
    fn read(&mut self, pv: &str) -> Result<f64, Self::Error> {
        T::read(self, pv)
    }

    #[inline]
    fn write(&mut self, pv: &str, value: f64, completion: Completion) -> Result<(), Self::Error> {
        T::write(self, pv, value, completion)
    }
}
