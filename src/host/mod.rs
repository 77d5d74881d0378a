//! The boundary between a flow and the design surface that renders it.
//!
//! The core never talks to a host surface itself. It hands an implementation of
//! [`HostAdapter`] a [`RenderPlan`] (what to draw, where, and whether an object
//! already exists for it) and writes the returned object identifiers back onto the
//! flow as opaque [`ExternalRef`]s.

use crate::error::{FlowError, SyncError};
use crate::layout::{LayoutConfig, Position, PositionMap, auto_layout};
use crate::model::{EntityRef, ExternalRef, Flow, Status};
use crate::ops::set_external_ref;
use serde::Serialize;

/// Whether the host must create a new object or update the one it made earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "externalRef", rename_all = "camelCase")]
pub enum RenderAction {
    Create,
    Update(ExternalRef),
}

impl RenderAction {
    fn for_ref(existing: &Option<ExternalRef>) -> Self {
        match existing {
            Some(r) => RenderAction::Update(r.clone()),
            None => RenderAction::Create,
        }
    }
}

/// One step or variant box to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDraw {
    pub entity: EntityRef,
    pub title: String,
    pub status: Status,
    /// Only set for variants.
    pub winner: bool,
    pub launched: bool,
    pub position: Position,
    pub action: RenderAction,
}

/// One connector from a variant box to a step box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorDraw {
    pub edge_id: String,
    pub from_variant_id: String,
    pub to_step_id: String,
    pub from: Position,
    pub to: Position,
    pub action: RenderAction,
}

/// Everything a host adapter needs to materialize or refresh a flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderPlan {
    pub nodes: Vec<NodeDraw>,
    pub connectors: Vec<ConnectorDraw>,
}

impl RenderPlan {
    pub fn creations(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| &n.action)
            .chain(self.connectors.iter().map(|c| &c.action))
            .filter(|a| **a == RenderAction::Create)
            .count()
    }
}

/// An object the host created or refreshed, reported back for storage on the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub entity: EntityRef,
    pub external_ref: ExternalRef,
}

/// A design surface that can draw a [`RenderPlan`].
pub trait HostAdapter {
    type Error;

    /// Draws or updates every object in `plan`, returning the identifiers of the objects touched.
    fn materialize(&mut self, plan: &RenderPlan) -> Result<Vec<Materialized>, Self::Error>;
}

/// Builds the render plan for `flow` from an already computed layout.
///
/// Connectors whose endpoints have no position are left out.
pub fn plan_render(flow: &Flow, positions: &PositionMap) -> RenderPlan {
    let mut plan = RenderPlan::default();

    for step in &flow.steps {
        if let Some(position) = positions.get(&step.id) {
            plan.nodes.push(NodeDraw {
                entity: EntityRef::Step(step.id.clone()),
                title: step.title.clone(),
                status: step.status,
                winner: false,
                launched: false,
                position: *position,
                action: RenderAction::for_ref(&step.external_ref),
            });
        }
    }
    for variant in &flow.variants {
        if let Some(position) = positions.get(&variant.id) {
            plan.nodes.push(NodeDraw {
                entity: EntityRef::Variant(variant.id.clone()),
                title: variant.title.clone(),
                status: variant.status,
                winner: variant.winner,
                launched: variant.launched,
                position: *position,
                action: RenderAction::for_ref(&variant.external_ref),
            });
        }
    }
    for edge in &flow.edges {
        match (
            positions.get(&edge.from_variant_id),
            positions.get(&edge.to_step_id),
        ) {
            (Some(from), Some(to)) => plan.connectors.push(ConnectorDraw {
                edge_id: edge.id.clone(),
                from_variant_id: edge.from_variant_id.clone(),
                to_step_id: edge.to_step_id.clone(),
                from: *from,
                to: *to,
                action: RenderAction::for_ref(&edge.external_ref),
            }),
            _ => tracing::warn!(edge_id = %edge.id, "skipping connector with unplaced endpoint"),
        }
    }

    plan
}

/// Writes host object identifiers onto the matching entities.
///
/// Fails with `NotFound` (and returns nothing) if any entity is missing from the flow.
pub fn apply_back_references(flow: &Flow, refs: &[Materialized]) -> Result<Flow, FlowError> {
    refs.iter().try_fold(flow.clone(), |current, m| {
        set_external_ref(&current, &m.entity, Some(m.external_ref.clone()))
    })
}

/// Lays out `flow`, lets `adapter` render it and returns the flow annotated with the
/// identifiers the adapter reported.
pub fn sync<A: HostAdapter>(
    adapter: &mut A,
    flow: &Flow,
    config: &LayoutConfig,
) -> Result<Flow, SyncError<A::Error>> {
    let positions = auto_layout(flow, config);
    let plan = plan_render(flow, &positions);
    tracing::debug!(
        nodes = plan.nodes.len(),
        connectors = plan.connectors.len(),
        creations = plan.creations(),
        "rendering flow"
    );
    let materialized = adapter.materialize(&plan).map_err(SyncError::Host)?;
    Ok(apply_back_references(flow, &materialized)?)
}
