//! Invariant-preserving transformations over a [`Flow`](crate::model::Flow).
//!
//! Every operation borrows the current flow and either returns a complete new flow
//! or fails with a [`FlowError`](crate::error::FlowError), leaving the input as it was.
//! Each result is checked against [`validate`] before it is returned.

mod command;
mod edit;
mod outcome;
mod structure;
pub mod validate;

pub use command::Command;
pub use edit::*;
pub use outcome::*;
pub use structure::{
    add_step_after_variant, add_variant, connect_variant_to_step, create_skeleton, move_variant,
    remove_edge, remove_step, remove_variant,
};
pub use validate::{Violation, validate};
