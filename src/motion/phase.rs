//! Deferred-move phase type-state markers.
//!
//! Uses Rust's type system so the gate is set before targets are written and
//! released before completion is polled.

/// Nothing written yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// Gate holds axis commands.
#[derive(Debug, Clone, Copy)]
pub struct GateSet;

/// Every target has been written while the gate is held.
#[derive(Debug, Clone, Copy)]
pub struct TargetsWritten;

/// Gate released, axes in motion.
#[derive(Debug, Clone, Copy)]
pub struct GateReleased;

/// Every axis reported done in the same poll.
#[derive(Debug, Clone, Copy)]
pub struct Done;

/// Trait for deferred-move phases.
pub trait Phase: private::Sealed {
    /// Phase name for logging.
    fn name() -> &'static str;
}

impl Phase for Idle {
    fn name() -> &'static str {
        "Idle"
    }
}

impl Phase for GateSet {
    fn name() -> &'static str {
        "GateSet"
    }
}

impl Phase for TargetsWritten {
    fn name() -> &'static str {
        "TargetsWritten"
    }
}

impl Phase for GateReleased {
    fn name() -> &'static str {
        "GateReleased"
    }
}

impl Phase for Done {
    fn name() -> &'static str {
        "Done"
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Idle {}
    impl Sealed for super::GateSet {}
    impl Sealed for super::TargetsWritten {}
    impl Sealed for super::GateReleased {}
    impl Sealed for super::Done {}
}
