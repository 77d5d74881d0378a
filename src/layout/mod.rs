//! Deterministic left-to-right, top-to-bottom placement of steps and variants.

mod config;

pub use config::LayoutConfig;

use crate::model::{Flow, Variant};
use ahash::AHashSet;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A 2-D coordinate in host-surface units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Coordinates for every step and variant id of a flow, in placement order.
pub type PositionMap = IndexMap<String, Position>;

/// Places every step on one baseline row and stacks each step's variants under it.
///
/// Step `i` sits at `start_x + i * step_gap_x`. Within a step, variants titled
/// "control" (any case) come first, then the rest in `variant_ids` order, each
/// one `variant_gap_y` below the previous, starting at `start_y`. Variants that
/// no step owns are stacked the same way in one extra column after the last step.
///
/// The result depends only on the flow's structure and titles, so editing other
/// fields never moves anything.
pub fn auto_layout(flow: &Flow, config: &LayoutConfig) -> PositionMap {
    let mut positions = PositionMap::with_capacity(flow.steps.len() + flow.variants.len());
    let mut placed: AHashSet<&str> = AHashSet::new();

    for (index, step) in flow.steps.iter().enumerate() {
        let x = column_x(config, index);
        positions
            .entry(step.id.clone())
            .or_insert(Position { x, y: config.start_y });

        let members = step
            .variant_ids
            .iter()
            .unique()
            .filter_map(|id| {
                let variant = flow.variant(id);
                if variant.is_none() {
                    tracing::warn!(step_id = %step.id, variant_id = %id, "skipping unknown variant in layout");
                }
                variant
            })
            .filter(|v| !placed.contains(v.id.as_str()))
            .collect_vec();

        for (slot, variant) in control_first(members).into_iter().enumerate() {
            placed.insert(variant.id.as_str());
            positions
                .entry(variant.id.clone())
                .or_insert(Position {
                    x,
                    y: row_y(config, slot),
                });
        }
    }

    let orphans = flow
        .variants
        .iter()
        .filter(|v| !placed.contains(v.id.as_str()))
        .collect_vec();
    if !orphans.is_empty() {
        let x = column_x(config, flow.steps.len());
        for (slot, variant) in control_first(orphans).into_iter().enumerate() {
            positions
                .entry(variant.id.clone())
                .or_insert(Position {
                    x,
                    y: row_y(config, slot),
                });
        }
    }

    positions
}

/// Stable reorder: control variants first, everything else keeps its relative order.
fn control_first(variants: Vec<&Variant>) -> Vec<&Variant> {
    let (controls, rest): (Vec<_>, Vec<_>) = variants.into_iter().partition(|v| v.is_control());
    controls.into_iter().chain(rest).collect()
}

fn column_x(config: &LayoutConfig, index: usize) -> f64 {
    config.start_x + index as f64 * config.step_gap_x
}

fn row_y(config: &LayoutConfig, slot: usize) -> f64 {
    config.start_y + slot as f64 * config.variant_gap_y
}
