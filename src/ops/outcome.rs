use super::validate::ensure_no_new_violations;
use crate::error::FlowError;
use crate::model::{Flow, Status};
use tracing::debug;

/// Marks `variant_id` as the winner of its step, clearing every sibling's winner flag.
///
/// Variants owned by other steps are left alone. A demoted sibling that had been
/// launched loses its launch as well, and its `Launched` status falls back to `Paused`.
pub fn mark_variant_as_winner(flow: &Flow, variant_id: &str) -> Result<Flow, FlowError> {
    if flow.variant(variant_id).is_none() {
        return Err(FlowError::variant_not_found(variant_id));
    }
    let siblings: Vec<String> = flow
        .owner_of(variant_id)
        .map(|step| step.variant_ids.clone())
        .unwrap_or_default();

    let mut next = flow.clone();
    for variant in &mut next.variants {
        if variant.id == variant_id {
            variant.winner = true;
        } else if siblings.contains(&variant.id) && variant.winner {
            variant.winner = false;
            if variant.launched {
                variant.launched = false;
                if variant.status == Status::Launched {
                    variant.status = Status::Paused;
                }
            }
            debug!(demoted = %variant.id, "cleared previous winner");
        }
    }

    debug!(variant_id, "marked variant as winner");
    ensure_no_new_violations("mark_variant_as_winner", flow, next)
}

/// Launches the current winner of `step_id`.
pub fn launch_winner_for_step(flow: &Flow, step_id: &str) -> Result<Flow, FlowError> {
    if flow.step(step_id).is_none() {
        return Err(FlowError::step_not_found(step_id));
    }
    let winner_id = flow
        .winner_of(step_id)
        .map(|v| v.id.clone())
        .ok_or_else(|| FlowError::NoWinner {
            step_id: step_id.to_string(),
        })?;

    let mut next = flow.clone();
    let winner = next.variant_mut(&winner_id)?;
    winner.launched = true;
    winner.status = Status::Launched;

    debug!(step_id, variant_id = %winner_id, "launched winner");
    ensure_no_new_violations("launch_winner_for_step", flow, next)
}
