use super::structure::require_title;
use super::validate::ensure_no_new_violations;
use crate::error::{EntityKind, FlowError};
use crate::model::{EntityRef, ExternalRef, Flow, Status};
use tracing::debug;

// Non-structural edits: none of these can move anything in the layout.

pub fn rename_step(flow: &Flow, step_id: &str, title: &str) -> Result<Flow, FlowError> {
    let mut next = flow.clone();
    let step = next.step_mut(step_id)?;
    require_title(EntityKind::Step, title)?;
    step.title = title.to_string();
    debug!(step_id, title, "renamed step");
    ensure_no_new_violations("rename_step", flow, next)
}

pub fn rename_variant(flow: &Flow, variant_id: &str, title: &str) -> Result<Flow, FlowError> {
    let mut next = flow.clone();
    next.variant_mut(variant_id)?.title = title.to_string();
    debug!(variant_id, title, "renamed variant");
    ensure_no_new_violations("rename_variant", flow, next)
}

/// Replaces the free-text description and KPI of a step.
pub fn set_step_details(
    flow: &Flow,
    step_id: &str,
    description: Option<String>,
    kpi: Option<String>,
) -> Result<Flow, FlowError> {
    let mut next = flow.clone();
    let step = next.step_mut(step_id)?;
    step.description = description;
    step.kpi = kpi;
    debug!(step_id, "updated step details");
    ensure_no_new_violations("set_step_details", flow, next)
}

pub fn set_step_status(flow: &Flow, step_id: &str, status: Status) -> Result<Flow, FlowError> {
    let mut next = flow.clone();
    next.step_mut(step_id)?.status = status;
    debug!(step_id, %status, "set step status");
    ensure_no_new_violations("set_step_status", flow, next)
}

pub fn set_variant_status(
    flow: &Flow,
    variant_id: &str,
    status: Status,
) -> Result<Flow, FlowError> {
    let mut next = flow.clone();
    next.variant_mut(variant_id)?.status = status;
    debug!(variant_id, %status, "set variant status");
    ensure_no_new_violations("set_variant_status", flow, next)
}

/// Sets a variant's traffic share. Shares of siblings are not required to sum to 100.
pub fn set_traffic_percent(flow: &Flow, variant_id: &str, percent: f64) -> Result<Flow, FlowError> {
    let mut next = flow.clone();
    let variant = next.variant_mut(variant_id)?;
    if !(0.0..=100.0).contains(&percent) {
        return Err(FlowError::InvalidTraffic {
            variant_id: variant_id.to_string(),
            value: percent,
        });
    }
    variant.traffic_percent = percent;
    debug!(variant_id, percent, "set traffic percent");
    ensure_no_new_violations("set_traffic_percent", flow, next)
}

/// Stores (or clears) the host object identifier of an entity.
pub fn set_external_ref(
    flow: &Flow,
    entity: &EntityRef,
    external_ref: Option<ExternalRef>,
) -> Result<Flow, FlowError> {
    let mut next = flow.clone();
    match entity {
        EntityRef::Step(id) => next.step_mut(id)?.external_ref = external_ref,
        EntityRef::Variant(id) => next.variant_mut(id)?.external_ref = external_ref,
        EntityRef::Edge(id) => next.edge_mut(id)?.external_ref = external_ref,
    }
    debug!(%entity, "updated external reference");
    Ok(next)
}
