use clap::{Parser, Subcommand, ValueEnum};
use splitflow::codec::{self, encode_pretty};
use splitflow::layout::LayoutConfig;
use splitflow::prelude::*;
use std::fs;
use tracing_subscriber::EnvFilter;

/// Edit, lay out and exchange experiment flow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow JSON document
    #[arg(short, long, default_value = "flow.json")]
    flow: String,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a new flow with one step and a Control variant
    New {
        name: String,
        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },
    /// Append a variant to a step
    AddVariant { step_id: String, title: String },
    /// Add a step fed by a variant
    AddStep { variant_id: String, title: String },
    /// Link a variant to an existing step
    Connect { variant_id: String, step_id: String },
    /// Mark a variant as the winner of its step
    Win { variant_id: String },
    /// Launch the winner of a step
    Launch { step_id: String },
    /// Print the coordinates of every step and variant
    Layout {
        /// Optional JSON file overriding the layout spacing
        #[arg(long)]
        layout_config: Option<String>,
    },
    /// Check the document against every flow invariant
    Validate,
    /// Write the flow to another file
    Export {
        output: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Replace the document with a validated import
    Import {
        input: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Binary,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        exit_with_error(&e.to_string());
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Cmd::New { name, force } => {
            if !force && fs::metadata(&cli.flow).is_ok() {
                return Err(format!("'{}' already exists, pass --force to replace it", cli.flow).into());
            }
            let flow = create_skeleton(&name)?;
            save(&cli.flow, &flow)?;
            println!("Created flow '{}' in '{}'", name, cli.flow);
            println!("  step    {}", flow.steps[0].id);
            println!("  control {}", flow.variants[0].id);
        }
        Cmd::AddVariant { step_id, title } => {
            apply(&cli.flow, Command::AddVariant { step_id, title })?;
        }
        Cmd::AddStep { variant_id, title } => {
            apply(
                &cli.flow,
                Command::AddStepAfterVariant {
                    source_variant_id: variant_id,
                    title,
                },
            )?;
        }
        Cmd::Connect {
            variant_id,
            step_id,
        } => {
            apply(
                &cli.flow,
                Command::ConnectVariantToStep {
                    source_variant_id: variant_id,
                    target_step_id: step_id,
                },
            )?;
        }
        Cmd::Win { variant_id } => {
            apply(&cli.flow, Command::MarkVariantAsWinner { variant_id })?;
        }
        Cmd::Launch { step_id } => {
            apply(&cli.flow, Command::LaunchWinnerForStep { step_id })?;
        }
        Cmd::Layout { layout_config } => {
            let flow = load(&cli.flow)?;
            let config = match layout_config {
                Some(path) => LayoutConfig::from_file(&path)?,
                None => LayoutConfig::default(),
            };
            let positions = auto_layout(&flow, &config);
            println!("{}", serde_json::to_string_pretty(&positions)?);
        }
        Cmd::Validate => {
            let flow = load(&cli.flow)?;
            match validate(&flow) {
                Ok(()) => println!(
                    "'{}' is valid: {} steps, {} variants, {} edges",
                    cli.flow,
                    flow.steps.len(),
                    flow.variants.len(),
                    flow.edges.len()
                ),
                Err(violations) => {
                    for v in &violations {
                        println!("  - {}", v);
                    }
                    return Err(format!("{} invariant violation(s) found", violations.len()).into());
                }
            }
        }
        Cmd::Export { output, format } => {
            let flow = load(&cli.flow)?;
            match format {
                Format::Json => fs::write(&output, encode_pretty(&flow))?,
                Format::Binary => fs::write(&output, codec::to_bytes(&flow)?)?,
            }
            println!("Exported '{}' to '{}'", cli.flow, output);
        }
        Cmd::Import { input, format } => {
            let flow = match format {
                Format::Json => import(&fs::read_to_string(&input)?)?,
                Format::Binary => codec::import_bytes(&fs::read(&input)?)?,
            };
            save(&cli.flow, &flow)?;
            println!("Imported '{}' into '{}'", input, cli.flow);
        }
    }
    Ok(())
}

/// Loads the document, applies one command and writes the result back.
fn apply(path: &str, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let flow = load(path)?;
    let next = command.apply(&flow)?;
    if next == flow {
        println!("No change");
        return Ok(());
    }
    save(path, &next)?;
    print_new_entities(&flow, &next);
    Ok(())
}

fn print_new_entities(before: &Flow, after: &Flow) {
    for step in after.steps.iter().filter(|s| before.step(&s.id).is_none()) {
        println!("  + step    {} ({})", step.id, step.title);
    }
    for variant in after.variants.iter().filter(|v| before.variant(&v.id).is_none()) {
        println!("  + variant {} ({})", variant.id, variant.title);
    }
    for edge in after.edges.iter().filter(|e| before.edge(&e.id).is_none()) {
        println!("  + edge    {} ({} -> {})", edge.id, edge.from_variant_id, edge.to_step_id);
    }
    println!("Saved");
}

fn load(path: &str) -> Result<Flow, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read flow file '{}': {}", path, e))?;
    Ok(decode(&text)?)
}

fn save(path: &str, flow: &Flow) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, encode_pretty(flow))
        .map_err(|e| format!("Failed to write flow file '{}': {}", path, e))?;
    Ok(())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
