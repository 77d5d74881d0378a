//! Tests for the auto-layout engine.
mod common;
use common::*;
use splitflow::ops::{move_variant, rename_variant, set_variant_status};
use splitflow::prelude::*;

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn test_default_spacing() {
        let (flow, ids) = create_checkout_flow();
        let positions = auto_layout(&flow, &LayoutConfig::default());

        assert_eq!(positions[&ids.landing], Position { x: 40.0, y: 80.0 });
        assert_eq!(positions[&ids.checkout], Position { x: 340.0, y: 80.0 });
        assert_eq!(positions[&ids.control], Position { x: 40.0, y: 80.0 });
        assert_eq!(positions[&ids.variant_b], Position { x: 40.0, y: 200.0 });
        assert_eq!(positions[&ids.express], Position { x: 340.0, y: 80.0 });
    }

    #[test]
    fn test_layout_covers_every_step_and_variant() {
        let (flow, _) = create_checkout_flow();
        let positions = auto_layout(&flow, &LayoutConfig::default());

        assert_eq!(positions.len(), flow.steps.len() + flow.variants.len());
        for id in flow.steps.iter().map(|s| &s.id).chain(flow.variants.iter().map(|v| &v.id)) {
            assert!(positions.contains_key(id), "missing position for {}", id);
        }
    }

    #[test]
    fn test_control_goes_first_even_when_moved() {
        let (flow, step, control, variant_b) = create_branched_flow();
        let flow = move_variant(&flow, &step, &control, 1).unwrap();
        assert_eq!(flow.steps[0].variant_ids, vec![variant_b.clone(), control.clone()]);

        let positions = auto_layout(&flow, &LayoutConfig::default());
        assert_eq!(positions[&control].y, 80.0);
        assert_eq!(positions[&variant_b].y, 200.0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let (flow, ids) = create_checkout_flow();
        let config = LayoutConfig::default();

        let first = auto_layout(&flow, &config);
        let second = auto_layout(&flow, &config);
        assert_eq!(first, second);

        // A rejected command leaves the flow, and therefore the layout, as it was.
        assert!(launch_winner_for_step(&flow, &ids.landing).is_err());
        assert_eq!(auto_layout(&flow, &config), first);
    }

    #[test]
    fn test_non_structural_edits_do_not_move_anything() {
        let (flow, ids) = create_checkout_flow();
        let config = LayoutConfig::default();
        let before = auto_layout(&flow, &config);

        let edited = rename_variant(&flow, &ids.express, "Express Pay").unwrap();
        let edited = set_variant_status(&edited, &ids.variant_b, Status::Paused).unwrap();
        let edited = mark_variant_as_winner(&edited, &ids.variant_b).unwrap();
        let edited = connect_variant_to_step(&edited, &ids.control, &ids.checkout).unwrap();

        assert_eq!(auto_layout(&edited, &config), before);
    }

    #[test]
    fn test_custom_config() {
        let (flow, ids) = create_checkout_flow();
        let config = LayoutConfig::from_json_str(
            r#"{ "stepGapX": 500, "variantGapY": 60, "startX": 0, "startY": 0 }"#,
        )
        .unwrap();
        let positions = auto_layout(&flow, &config);

        assert_eq!(positions[&ids.checkout], Position { x: 500.0, y: 0.0 });
        assert_eq!(positions[&ids.variant_b], Position { x: 0.0, y: 60.0 });
    }

    #[test]
    fn test_bad_config_is_rejected() {
        assert!(LayoutConfig::from_json_str(r#"{ "stepGapX": "wide" }"#).is_err());
        assert!(LayoutConfig::from_file("does/not/exist.json").is_err());
    }
}
