//! Process variable access and addressing.
//!
//! Provides the transport port trait and the typed field accessors used to
//! build PV names.

mod access;
mod axis;
mod field;

pub use access::{Completion, Error, ErrorType, PvAccess, TransportErrorKind};
pub use axis::{Axis, DeferGate};
pub use field::{AuxField, Field};

/// Longest motor record base name accepted.
pub const MAX_BASE_LEN: usize = 64;

/// Bounded motor record base name.
pub type AxisName = heapless::String<MAX_BASE_LEN>;

/// Bounded full PV name (base plus field or auxiliary suffix).
pub type PvName = heapless::String<96>;

/// Read `pv`, attaching the PV name to a transport failure.
pub(crate) fn get<P: PvAccess + ?Sized>(port: &mut P, pv: &PvName) -> crate::Result<f64> {
    port.read(pv.as_str()).map_err(|e| crate::Error::read(pv, e.kind()))
}

/// Write `pv`, attaching the PV name to a transport failure.
pub(crate) fn put<P: PvAccess + ?Sized>(
    port: &mut P,
    pv: &PvName,
    value: f64,
    completion: Completion,
) -> crate::Result<()> {
    port.write(pv.as_str(), value, completion).map_err(|e| crate::Error::write(pv, e.kind()))
}
