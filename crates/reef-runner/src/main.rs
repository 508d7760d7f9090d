//! Headless runner for the Reef ecosystem simulation.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use reef_core::{LogFormat, RunnerConfig};
use reef_world::Simulation;
use tracing::info;

/// Run the reef simulation and print a JSON summary
#[derive(Parser, Debug)]
#[command(name = "reef-runner")]
#[command(about = "Run the grid ecosystem simulation headlessly")]
struct Args {
    /// JSON config file; defaults are used when omitted
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Override the number of steps
    #[arg(long)]
    steps: Option<u64>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Emit JSON log lines
    #[arg(long)]
    json: bool,

    /// Log every organism death
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => RunnerConfig::default(),
    };
    if let Some(steps) = args.steps {
        config.simulation.num_steps = steps;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if args.json {
        config.log_format = LogFormat::Json;
    }

    telemetry::init_telemetry(config.log_format, args.verbose)?;

    info!(
        seed = config.simulation.seed,
        depth = config.simulation.field.depth,
        width = config.simulation.field.width,
        "Starting reef runner"
    );

    let mut simulation = Simulation::new(config.simulation)?;
    let summary = simulation.run();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
