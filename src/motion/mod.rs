//! Motion operations for axis-harness.
//!
//! Single-axis moves, position re-referencing, synchronized deferred moves
//! and drive power control, all exposed as methods on [`Harness`].

mod controller;
mod deferred;
mod drive;
pub mod phase;

pub use controller::Harness;
pub use deferred::{DeferredMove, MoveRequest, PollLoop};
pub use drive::DrivePower;
