//! Common test utilities for building flows.
use splitflow::prelude::*;

/// Ids of the entities created by [`create_checkout_flow`].
#[allow(dead_code)]
pub struct CheckoutIds {
    pub landing: String,
    pub control: String,
    pub variant_b: String,
    pub checkout: String,
    pub express: String,
}

/// Skeleton "Checkout Test" plus a second variant on the first step.
#[allow(dead_code)]
pub fn create_branched_flow() -> (Flow, String, String, String) {
    let flow = create_skeleton("Checkout Test").expect("skeleton");
    let step = flow.steps[0].id.clone();
    let control = flow.variants[0].id.clone();
    let flow = add_variant(&flow, &step, "Variant B").expect("add variant");
    let variant_b = flow.steps[0].variant_ids[1].clone();
    (flow, step, control, variant_b)
}

/// Two-step funnel:
///
/// `Landing [Control, Variant B]` --(Variant B)--> `Checkout [Express]`
#[allow(dead_code)]
pub fn create_checkout_flow() -> (Flow, CheckoutIds) {
    let flow = create_skeleton("Landing").expect("skeleton");
    let landing = flow.steps[0].id.clone();
    let control = flow.variants[0].id.clone();
    let flow = add_variant(&flow, &landing, "Variant B").expect("add variant");
    let variant_b = flow.steps[0].variant_ids[1].clone();
    let flow = add_step_after_variant(&flow, &variant_b, "Checkout").expect("add step");
    let checkout = flow.steps[1].id.clone();
    let flow = add_variant(&flow, &checkout, "Express").expect("add variant");
    let express = flow.steps[1].variant_ids[0].clone();

    (
        flow,
        CheckoutIds {
            landing,
            control,
            variant_b,
            checkout,
            express,
        },
    )
}
