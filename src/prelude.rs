//! Prelude module for convenient imports
//!
//! Re-exports the types and operations most callers need, so that
//! `use splitflow::prelude::*;` is enough to build, mutate, lay out and store a flow.

// Graph model
pub use crate::model::{Edge, EntityRef, ExternalRef, Flow, Status, Step, Variant};

// Mutation operations
pub use crate::ops::{
    Command, Violation, add_step_after_variant, add_variant, connect_variant_to_step,
    create_skeleton, launch_winner_for_step, mark_variant_as_winner, validate,
};

// Layout
pub use crate::layout::{LayoutConfig, Position, PositionMap, auto_layout};

// Serialization
pub use crate::codec::{decode, encode, import};

// State threading and host boundary
pub use crate::history::FlowHistory;
pub use crate::host::{HostAdapter, Materialized, RenderPlan};

// Error types
pub use crate::error::{EntityKind, FlowError};
