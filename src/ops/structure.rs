use super::validate::ensure_no_new_violations;
use crate::error::{EntityKind, FlowError};
use crate::model::{Edge, Flow, Status, Step, Variant};
use tracing::debug;

pub(super) fn require_title(kind: EntityKind, title: &str) -> Result<(), FlowError> {
    if title.trim().is_empty() {
        Err(FlowError::EmptyTitle { kind })
    } else {
        Ok(())
    }
}

/// Creates a new flow holding one running step with a single "Control" variant.
pub fn create_skeleton(name: &str) -> Result<Flow, FlowError> {
    require_title(EntityKind::Step, name)?;

    let empty = Flow::default();
    let step_id = empty.fresh_step_id();
    let variant_id = empty.fresh_variant_id();

    let mut step = Step::new(step_id, name.to_string(), Status::Running);
    step.variant_ids.push(variant_id.clone());
    let control = Variant::new(variant_id, "Control".to_string(), 100.0, Status::Running);

    let flow = Flow {
        steps: vec![step],
        variants: vec![control],
        edges: Vec::new(),
    };
    debug!(step_id = %flow.steps[0].id, name, "created flow skeleton");
    ensure_no_new_violations("create_skeleton", &empty, flow)
}

/// Appends a new backlog variant to the end of `step_id`'s variants.
pub fn add_variant(flow: &Flow, step_id: &str, title: &str) -> Result<Flow, FlowError> {
    if flow.step(step_id).is_none() {
        return Err(FlowError::step_not_found(step_id));
    }

    let mut next = flow.clone();
    let variant_id = next.fresh_variant_id();
    next.variants.push(Variant::new(
        variant_id.clone(),
        title.to_string(),
        0.0,
        Status::Backlog,
    ));
    next.step_mut(step_id)?.variant_ids.push(variant_id.clone());

    debug!(step_id, %variant_id, title, "added variant");
    ensure_no_new_violations("add_variant", flow, next)
}

/// Adds an empty backlog step and links `source_variant_id` to it.
pub fn add_step_after_variant(
    flow: &Flow,
    source_variant_id: &str,
    title: &str,
) -> Result<Flow, FlowError> {
    if flow.variant(source_variant_id).is_none() {
        return Err(FlowError::variant_not_found(source_variant_id));
    }
    require_title(EntityKind::Step, title)?;

    let mut next = flow.clone();
    let step_id = next.fresh_step_id();
    next.steps
        .push(Step::new(step_id.clone(), title.to_string(), Status::Backlog));
    let edge_id = next.fresh_edge_id();
    next.edges.push(Edge {
        id: edge_id.clone(),
        from_variant_id: source_variant_id.to_string(),
        to_step_id: step_id.clone(),
        external_ref: None,
    });

    debug!(source_variant_id, %step_id, %edge_id, title, "added step after variant");
    ensure_no_new_violations("add_step_after_variant", flow, next)
}

/// Links a variant to a step. Connecting an already-linked pair returns the flow unchanged.
pub fn connect_variant_to_step(
    flow: &Flow,
    source_variant_id: &str,
    target_step_id: &str,
) -> Result<Flow, FlowError> {
    if flow.variant(source_variant_id).is_none() {
        return Err(FlowError::variant_not_found(source_variant_id));
    }
    if flow.step(target_step_id).is_none() {
        return Err(FlowError::step_not_found(target_step_id));
    }
    if flow
        .edges
        .iter()
        .any(|e| e.connects(source_variant_id, target_step_id))
    {
        debug!(
            source_variant_id,
            target_step_id, "edge already exists, connect is a no-op"
        );
        return Ok(flow.clone());
    }

    let mut next = flow.clone();
    let edge_id = next.fresh_edge_id();
    next.edges.push(Edge {
        id: edge_id.clone(),
        from_variant_id: source_variant_id.to_string(),
        to_step_id: target_step_id.to_string(),
        external_ref: None,
    });

    debug!(source_variant_id, target_step_id, %edge_id, "connected variant to step");
    ensure_no_new_violations("connect_variant_to_step", flow, next)
}

pub fn remove_edge(flow: &Flow, edge_id: &str) -> Result<Flow, FlowError> {
    if flow.edge(edge_id).is_none() {
        return Err(FlowError::edge_not_found(edge_id));
    }

    let mut next = flow.clone();
    next.edges.retain(|e| e.id != edge_id);

    debug!(edge_id, "removed edge");
    ensure_no_new_violations("remove_edge", flow, next)
}

/// Removes a variant, its membership in its step and every edge leaving it.
pub fn remove_variant(flow: &Flow, variant_id: &str) -> Result<Flow, FlowError> {
    if flow.variant(variant_id).is_none() {
        return Err(FlowError::variant_not_found(variant_id));
    }

    let dropped_edges = flow.outgoing_edges(variant_id).count();

    let mut next = flow.clone();
    next.variants.retain(|v| v.id != variant_id);
    for step in &mut next.steps {
        step.variant_ids.retain(|id| id != variant_id);
    }
    next.edges.retain(|e| e.from_variant_id != variant_id);

    debug!(variant_id, dropped_edges, "removed variant");
    ensure_no_new_violations("remove_variant", flow, next)
}

/// Removes a step together with its variants, their outgoing edges and every edge into the step.
pub fn remove_step(flow: &Flow, step_id: &str) -> Result<Flow, FlowError> {
    let Some(step) = flow.step(step_id) else {
        return Err(FlowError::step_not_found(step_id));
    };
    let owned = step.variant_ids.clone();
    let inbound_edges = flow.incoming_edges(step_id).count();

    let mut next = flow.clone();
    next.steps.retain(|s| s.id != step_id);
    next.variants.retain(|v| !owned.contains(&v.id));
    next.edges
        .retain(|e| e.to_step_id != step_id && !owned.contains(&e.from_variant_id));

    debug!(
        step_id,
        removed_variants = owned.len(),
        inbound_edges,
        "removed step"
    );
    ensure_no_new_violations("remove_step", flow, next)
}

/// Moves a variant to `new_index` within its step's display order, clamped to the last slot.
pub fn move_variant(
    flow: &Flow,
    step_id: &str,
    variant_id: &str,
    new_index: usize,
) -> Result<Flow, FlowError> {
    let step = flow
        .step(step_id)
        .ok_or_else(|| FlowError::step_not_found(step_id))?;
    let Some(current) = step.variant_ids.iter().position(|id| id == variant_id) else {
        return Err(FlowError::variant_not_found(variant_id));
    };

    let mut next = flow.clone();
    let ids = &mut next.step_mut(step_id)?.variant_ids;
    let moved = ids.remove(current);
    let target = new_index.min(ids.len());
    ids.insert(target, moved);

    debug!(step_id, variant_id, from = current, to = target, "moved variant");
    ensure_no_new_violations("move_variant", flow, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_rejects_blank_name() {
        assert_eq!(
            create_skeleton("   ").unwrap_err(),
            FlowError::EmptyTitle {
                kind: EntityKind::Step
            }
        );
    }

    #[test]
    fn remove_step_drops_owned_variants_and_touching_edges() {
        let flow = create_skeleton("Landing").unwrap();
        let control = flow.variants[0].id.clone();
        let flow = add_step_after_variant(&flow, &control, "Checkout").unwrap();
        let checkout = flow.steps[1].id.clone();
        let flow = add_variant(&flow, &checkout, "Express").unwrap();
        let express = flow.variants[1].id.clone();
        let flow = connect_variant_to_step(&flow, &express, &flow.steps[0].id.clone()).unwrap();
        assert_eq!(flow.edges.len(), 2);

        let flow = remove_step(&flow, &checkout).unwrap();
        assert_eq!(flow.steps.len(), 1);
        assert!(flow.variant(&express).is_none());
        assert!(flow.edges.is_empty());
    }

    #[test]
    fn move_variant_clamps_to_end() {
        let flow = create_skeleton("Landing").unwrap();
        let step = flow.steps[0].id.clone();
        let flow = add_variant(&flow, &step, "B").unwrap();
        let control = flow.steps[0].variant_ids[0].clone();

        let flow = move_variant(&flow, &step, &control, 99).unwrap();
        assert_eq!(flow.steps[0].variant_ids.last(), Some(&control));
    }

    #[test]
    fn move_variant_requires_membership() {
        let flow = create_skeleton("Landing").unwrap();
        let step = flow.steps[0].id.clone();
        let err = move_variant(&flow, &step, "variant_elsewhere", 0).unwrap_err();
        assert!(matches!(err, FlowError::NotFound { kind: EntityKind::Variant, .. }));
    }
}
