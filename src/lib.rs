//! # Splitflow - Experiment Flow Graphs
//!
//! **Splitflow** models an experiment funnel as a small graph: *steps* (funnel stages)
//! own ordered *variants* (the treatments tested in that stage), and *edges* lead from a
//! variant into the step its traffic continues to. The crate provides the graph model,
//! a fixed set of invariant-preserving mutations, a deterministic auto-layout and a
//! portable text encoding. Rendering is left to a host surface behind the
//! [`host::HostAdapter`] trait.
//!
//! ## Core Workflow
//!
//! A `Flow` is a plain value. The caller owns the current flow and replaces it with the
//! result of each successful operation; a failed operation returns an error and leaves
//! the caller's flow untouched.
//!
//! 1.  **Create**: start from [`ops::create_skeleton`], a single step with a "Control" variant.
//! 2.  **Mutate**: grow the graph with the functions in [`ops`] (or [`ops::Command`] values,
//!     optionally through a [`history::FlowHistory`] for undo/redo).
//! 3.  **Persist**: store the flow with [`codec::encode`] and read it back with [`codec::decode`].
//! 4.  **Lay out**: compute coordinates with [`layout::auto_layout`] and hand them, via
//!     [`host::sync`], to a host adapter.
//!
//! ## Quick Start
//!
//! ```rust
//! use splitflow::prelude::*;
//!
//! fn main() -> Result<(), FlowError> {
//!     let flow = create_skeleton("Checkout Test")?;
//!     let step_id = flow.steps[0].id.clone();
//!
//!     let flow = add_variant(&flow, &step_id, "Variant B")?;
//!     let variant_b = flow.steps[0].variant_ids[1].clone();
//!
//!     let flow = mark_variant_as_winner(&flow, &variant_b)?;
//!     let flow = launch_winner_for_step(&flow, &step_id)?;
//!     assert!(flow.variant(&variant_b).unwrap().launched);
//!
//!     let positions = auto_layout(&flow, &LayoutConfig::default());
//!     assert_eq!(positions[&variant_b], Position { x: 40.0, y: 200.0 });
//!
//!     let restored = decode(&encode(&flow))?;
//!     assert_eq!(restored, flow);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod error;
pub mod history;
pub mod host;
pub mod layout;
pub mod model;
pub mod ops;
pub mod prelude;
