use super::*;
use crate::error::FlowError;
use crate::model::{EntityRef, ExternalRef, Flow, Status};
use serde::{Deserialize, Serialize};

/// A serializable request from the UI layer, one per mutation operation.
///
/// ```rust
/// use splitflow::ops::{Command, create_skeleton};
///
/// let flow = create_skeleton("Checkout Test").unwrap();
/// let step_id = flow.steps[0].id.clone();
/// let cmd: Command = serde_json::from_str(&format!(
///     r#"{{"op":"addVariant","stepId":"{}","title":"Variant B"}}"#,
///     step_id
/// ))
/// .unwrap();
/// let flow = cmd.apply(&flow).unwrap();
/// assert_eq!(flow.variants.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    AddVariant {
        step_id: String,
        title: String,
    },
    AddStepAfterVariant {
        source_variant_id: String,
        title: String,
    },
    ConnectVariantToStep {
        source_variant_id: String,
        target_step_id: String,
    },
    MarkVariantAsWinner {
        variant_id: String,
    },
    LaunchWinnerForStep {
        step_id: String,
    },
    RenameStep {
        step_id: String,
        title: String,
    },
    RenameVariant {
        variant_id: String,
        title: String,
    },
    SetStepDetails {
        step_id: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        kpi: Option<String>,
    },
    SetStepStatus {
        step_id: String,
        status: Status,
    },
    SetVariantStatus {
        variant_id: String,
        status: Status,
    },
    SetTrafficPercent {
        variant_id: String,
        percent: f64,
    },
    SetExternalRef {
        entity: EntityRef,
        #[serde(default)]
        external_ref: Option<ExternalRef>,
    },
    RemoveEdge {
        edge_id: String,
    },
    RemoveVariant {
        variant_id: String,
    },
    RemoveStep {
        step_id: String,
    },
    MoveVariant {
        step_id: String,
        variant_id: String,
        new_index: usize,
    },
}

impl Command {
    /// Applies the command to `flow`, returning the new flow. `flow` itself is never modified.
    pub fn apply(&self, flow: &Flow) -> Result<Flow, FlowError> {
        match self {
            Command::AddVariant { step_id, title } => add_variant(flow, step_id, title),
            Command::AddStepAfterVariant {
                source_variant_id,
                title,
            } => add_step_after_variant(flow, source_variant_id, title),
            Command::ConnectVariantToStep {
                source_variant_id,
                target_step_id,
            } => connect_variant_to_step(flow, source_variant_id, target_step_id),
            Command::MarkVariantAsWinner { variant_id } => mark_variant_as_winner(flow, variant_id),
            Command::LaunchWinnerForStep { step_id } => launch_winner_for_step(flow, step_id),
            Command::RenameStep { step_id, title } => rename_step(flow, step_id, title),
            Command::RenameVariant { variant_id, title } => rename_variant(flow, variant_id, title),
            Command::SetStepDetails {
                step_id,
                description,
                kpi,
            } => set_step_details(flow, step_id, description.clone(), kpi.clone()),
            Command::SetStepStatus { step_id, status } => set_step_status(flow, step_id, *status),
            Command::SetVariantStatus { variant_id, status } => {
                set_variant_status(flow, variant_id, *status)
            }
            Command::SetTrafficPercent {
                variant_id,
                percent,
            } => set_traffic_percent(flow, variant_id, *percent),
            Command::SetExternalRef {
                entity,
                external_ref,
            } => set_external_ref(flow, entity, external_ref.clone()),
            Command::RemoveEdge { edge_id } => remove_edge(flow, edge_id),
            Command::RemoveVariant { variant_id } => remove_variant(flow, variant_id),
            Command::RemoveStep { step_id } => remove_step(flow, step_id),
            Command::MoveVariant {
                step_id,
                variant_id,
                new_index,
            } => move_variant(flow, step_id, variant_id, *new_index),
        }
    }

    /// Whether applying this command can change the computed layout.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Command::AddVariant { .. }
                | Command::AddStepAfterVariant { .. }
                | Command::RemoveVariant { .. }
                | Command::RemoveStep { .. }
                | Command::MoveVariant { .. }
                | Command::RenameVariant { .. }
        )
    }
}
