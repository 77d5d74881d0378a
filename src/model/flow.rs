use super::entity::{Edge, Step, Variant};
use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The aggregate root of an experiment graph.
///
/// A `Flow` is treated as an immutable value: mutation operations in [`crate::ops`]
/// borrow it and return a new `Flow`. Insertion order of `steps` is the layout order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Flow {
    pub steps: Vec<Step>,
    pub variants: Vec<Variant>,
    pub edges: Vec<Edge>,
}

impl Flow {
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub(crate) fn step_mut(&mut self, id: &str) -> Result<&mut Step, FlowError> {
        self.steps
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| FlowError::step_not_found(id))
    }

    pub(crate) fn variant_mut(&mut self, id: &str) -> Result<&mut Variant, FlowError> {
        self.variants
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| FlowError::variant_not_found(id))
    }

    pub(crate) fn edge_mut(&mut self, id: &str) -> Result<&mut Edge, FlowError> {
        self.edges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| FlowError::edge_not_found(id))
    }

    /// The step whose `variant_ids` lists `variant_id`, if any.
    pub fn owner_of(&self, variant_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.contains_variant(variant_id))
    }

    /// Variants of a step in display order, skipping ids that do not resolve.
    pub fn variants_of<'a>(&'a self, step: &'a Step) -> impl Iterator<Item = &'a Variant> + 'a {
        step.variant_ids.iter().filter_map(|id| self.variant(id))
    }

    /// The variant of `step_id` currently marked as winner.
    pub fn winner_of(&self, step_id: &str) -> Option<&Variant> {
        let step = self.step(step_id)?;
        self.variants_of(step).find(|v| v.winner)
    }

    pub fn outgoing_edges<'a>(&'a self, variant_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.from_variant_id == variant_id)
    }

    pub fn incoming_edges<'a>(&'a self, step_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.to_step_id == step_id)
    }

    pub(crate) fn fresh_step_id(&self) -> String {
        fresh_id("step", |id| self.step(id).is_some())
    }

    pub(crate) fn fresh_variant_id(&self) -> String {
        fresh_id("variant", |id| self.variant(id).is_some())
    }

    pub(crate) fn fresh_edge_id(&self) -> String {
        fresh_id("edge", |id| self.edge(id).is_some())
    }
}

/// Draws `<prefix>_<uuid>` ids until one is unused.
fn fresh_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = format!("{}_{}", prefix, Uuid::new_v4().simple());
        if !taken(&id) {
            return id;
        }
    }
}
