use clap::Parser;
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use splitflow::codec::encode_pretty;
use splitflow::prelude::*;
use std::fs;
use tracing_subscriber::EnvFilter;

/// A CLI tool to generate random experiment flows for exercising layouts and host adapters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated flow JSON file to
    #[arg(short, long, default_value = "generated_flow.json")]
    output: String,

    /// Number of steps to generate, including the first one
    #[arg(long, default_value_t = 5)]
    steps: usize,

    /// Maximum number of extra variants per step (besides Control)
    #[arg(long, default_value_t = 3)]
    max_variants: usize,

    /// Number of additional cross links between variants and later steps
    #[arg(long, default_value_t = 2)]
    links: usize,
}

const TITLES: &[&str] = &[
    "Landing", "Pricing", "Signup", "Onboarding", "Checkout", "Upsell", "Confirmation",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    if cli.steps == 0 {
        eprintln!("Error: --steps must be at least 1");
        std::process::exit(1);
    }

    let mut rng = rand::rng();
    println!(
        "Generating flow with {} step(s), up to {} extra variant(s) each...",
        cli.steps, cli.max_variants
    );

    let mut flow = create_skeleton(&step_title(0))?;
    flow = populate_step(&mut rng, flow, 0, cli.max_variants)?;

    for index in 1..cli.steps {
        let source = random_variant(&mut rng, &flow)?;
        flow = add_step_after_variant(&flow, &source, &step_title(index))?;
        flow = populate_step(&mut rng, flow, index, cli.max_variants)?;
    }

    for _ in 0..cli.links {
        let variant = random_variant(&mut rng, &flow)?;
        let target = flow.steps[rng.random_range(0..flow.steps.len())].id.clone();
        flow = connect_variant_to_step(&flow, &variant, &target)?;
    }

    // Pick and launch winners on roughly half of the steps.
    let step_ids: Vec<String> = flow.steps.iter().map(|s| s.id.clone()).collect();
    for step_id in step_ids {
        if !rng.random_bool(0.5) {
            continue;
        }
        let candidates = flow.steps.iter().find(|s| s.id == step_id).map(|s| s.variant_ids.clone());
        if let Some(winner) = candidates.as_deref().and_then(|ids| ids.choose(&mut rng)) {
            flow = mark_variant_as_winner(&flow, winner)?;
            if rng.random_bool(0.5) {
                flow = launch_winner_for_step(&flow, &step_id)?;
            }
        }
    }

    fs::write(&cli.output, encode_pretty(&flow))?;
    println!(
        "Successfully generated {} steps, {} variants and {} edges into '{}'",
        flow.steps.len(),
        flow.variants.len(),
        flow.edges.len(),
        cli.output
    );

    Ok(())
}

fn step_title(index: usize) -> String {
    let base = TITLES[index % TITLES.len()];
    if index < TITLES.len() {
        base.to_string()
    } else {
        format!("{} {}", base, index / TITLES.len() + 1)
    }
}

/// Adds between 0 and `max` lettered variants to the step at `index`.
fn populate_step(
    rng: &mut ThreadRng,
    mut flow: Flow,
    index: usize,
    max: usize,
) -> Result<Flow, FlowError> {
    let step_id = flow.steps[index].id.clone();
    let count = rng.random_range(0..=max);
    for letter in (b'A'..=b'Z').take(count) {
        flow = add_variant(&flow, &step_id, &format!("Variant {}", letter as char))?;
    }
    Ok(flow)
}

fn random_variant(rng: &mut ThreadRng, flow: &Flow) -> Result<String, Box<dyn std::error::Error>> {
    let variant = flow
        .variants
        .choose(rng)
        .ok_or("flow has no variants to branch from")?;
    Ok(variant.id.clone())
}
