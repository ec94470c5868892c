//! Verification module for axis-harness.
//!
//! Provides deadband comparison and post-move state validation.

mod deadband;
mod validator;

pub use deadband::{excursion, within_deadband};
pub use validator::{
    post_move_check, quiescent_survey, verify_field, verify_position, Expectation, Survey,
    QUIESCENT_FIELDS, QUIESCENT_STATE,
};
