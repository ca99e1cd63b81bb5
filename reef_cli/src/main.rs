// reef: command-line driver for the reef simulation.
//
// Subcommands:
// - `run`:   populate one reef and step it until it terminates or the step
//            count is reached, drawing it with the chosen renderer.
// - `sweep`: run many independently seeded reefs in parallel (rayon) and
//            report when and why each one ended.
//
// Settings come from an optional JSON config file (`--config`) with
// individual flags layered on top. Logging goes to stderr through
// `tracing-subscriber`, filtered by `RUST_LOG` (default `reef=info`), so
// stdout carries only renderer output.
//
// See also: `renderers.rs` for the ASCII, JSON-lines and summary renderers.

mod renderers;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use reef_sim::config::SimConfig;
use reef_sim::field::Neighborhood;
use reef_sim::render::{NullRenderer, Renderer};
use reef_sim::sim::{LONG_RUN_STEPS, RunPhase, SimState};
use reef_sim::types::{Species, SpeciesSet};
use renderers::{AsciiRenderer, JsonLinesRenderer, SummaryRenderer};
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "reef")]
#[command(about = "Reef ecosystem simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run {
        #[command(flatten)]
        world: WorldArgs,
        /// Steps to run.
        #[arg(long, default_value_t = LONG_RUN_STEPS)]
        steps: u64,
        #[arg(long, value_enum, default_value_t = RenderFormat::Summary)]
        render: RenderFormat,
        /// Draw only every Nth step (ascii and summary renderers).
        #[arg(long, default_value_t = 1)]
        every: u64,
        /// Pause between steps, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    Sweep {
        #[command(flatten)]
        world: WorldArgs,
        /// Number of seeds to run.
        #[arg(long, default_value_t = 8)]
        seeds: u64,
        /// Seed of the first run; the others follow consecutively.
        #[arg(long, default_value_t = 0)]
        first_seed: u64,
        /// Step limit per run.
        #[arg(long, default_value_t = LONG_RUN_STEPS)]
        steps: u64,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Flags shared by every subcommand. Unset flags leave the config file (or
/// the defaults) alone.
#[derive(Args, Debug)]
struct WorldArgs {
    /// JSON file with a full or partial SimConfig.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    depth: Option<i64>,
    #[arg(long)]
    width: Option<i64>,
    /// Steps per day/night cycle.
    #[arg(long)]
    cycle: Option<i64>,
    /// Baseline warming per cycle.
    #[arg(long)]
    temp_increase: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    neighborhood: Option<NeighborhoodArg>,
    /// Minimum number of living species for the run to continue.
    #[arg(long)]
    min_species: Option<usize>,
    /// Seed only these species, e.g. `--only shark,small-fish,seagrass`.
    #[arg(long, value_delimiter = ',')]
    only: Vec<Species>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RenderFormat {
    Ascii,
    Json,
    Summary,
    None,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NeighborhoodArg {
    Moore,
    VonNeumann,
}

impl From<NeighborhoodArg> for Neighborhood {
    fn from(arg: NeighborhoodArg) -> Self {
        match arg {
            NeighborhoodArg::Moore => Neighborhood::Moore,
            NeighborhoodArg::VonNeumann => Neighborhood::VonNeumann,
        }
    }
}

#[derive(Debug, Serialize)]
struct SweepRow {
    seed: u64,
    steps: u64,
    outcome: String,
    population: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "reef=info".to_owned()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            world,
            steps,
            render,
            every,
            delay_ms,
        } => {
            let mut config = load_config(&world)?;
            if let Some(delay) = delay_ms {
                config.step_delay_ms = delay;
            }
            run_command(config, steps, render, every)
        }
        Commands::Sweep {
            world,
            seeds,
            first_seed,
            steps,
            json,
        } => {
            let config = load_config(&world)?;
            sweep_command(config, first_seed, seeds, steps, json)
        }
    }
}

fn load_config(world: &WorldArgs) -> Result<SimConfig> {
    let mut config = match &world.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SimConfig::from_json(&raw)
                .with_context(|| format!("failed to parse JSON config {}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(depth) = world.depth {
        config.depth = depth;
    }
    if let Some(width) = world.width {
        config.width = width;
    }
    if let Some(cycle) = world.cycle {
        config.day_night_cycle = cycle;
    }
    if let Some(increase) = world.temp_increase {
        config.daily_temp_increase = increase;
    }
    if let Some(seed) = world.seed {
        config.seed = seed;
    }
    if let Some(neighborhood) = world.neighborhood {
        config.neighborhood = neighborhood.into();
    }
    if let Some(min) = world.min_species {
        config.min_viable_species = min;
    }
    if !world.only.is_empty() {
        if world.only.contains(&Species::Corpse) {
            bail!("corpses cannot be seeded");
        }
        config.seeded_species = SpeciesSet::of(&world.only);
    }
    Ok(config)
}

fn run_command(config: SimConfig, steps: u64, render: RenderFormat, every: u64) -> Result<()> {
    let stdout = BufWriter::new(io::stdout().lock());
    match render {
        RenderFormat::Ascii => {
            let mut renderer = AsciiRenderer::new(stdout, every);
            drive(config, steps, &mut renderer);
            renderer.finish().context("failed writing frames")
        }
        RenderFormat::Json => {
            let mut renderer = JsonLinesRenderer::new(stdout);
            drive(config, steps, &mut renderer);
            renderer.finish().context("failed writing status lines")
        }
        RenderFormat::Summary => {
            let mut renderer = SummaryRenderer::new(stdout, every);
            drive(config, steps, &mut renderer);
            renderer.finish().context("failed writing summary")
        }
        RenderFormat::None => {
            drive(config, steps, &mut NullRenderer);
            Ok(())
        }
    }
}

/// Reset and step a fresh simulation, pausing between steps if asked to.
fn drive(config: SimConfig, steps: u64, renderer: &mut dyn Renderer) -> SimState {
    let delay = Duration::from_millis(config.step_delay_ms);
    let mut sim = SimState::new(config);
    sim.reset(renderer);
    if delay.is_zero() {
        sim.simulate(steps, renderer);
    } else {
        for _ in 0..steps {
            if sim.is_terminal() {
                break;
            }
            sim.step(renderer);
            std::thread::sleep(delay);
        }
    }
    tracing::info!(
        step = sim.step_count(),
        phase = ?sim.run_phase(),
        population = %sim.stats().details(),
        "run complete"
    );
    sim
}

fn sweep_command(config: SimConfig, first_seed: u64, seeds: u64, steps: u64, json: bool) -> Result<()> {
    let rows: Vec<SweepRow> = (first_seed..first_seed.saturating_add(seeds))
        .into_par_iter()
        .map(|seed| {
            let mut sim = SimState::new(SimConfig {
                seed,
                ..config.clone()
            });
            sim.reset(&mut NullRenderer);
            sim.simulate(steps, &mut NullRenderer);
            SweepRow {
                seed,
                steps: sim.step_count(),
                outcome: match sim.run_phase() {
                    RunPhase::Terminal(reason) => format!("{reason:?}"),
                    RunPhase::Running | RunPhase::Idle => "Running".to_owned(),
                },
                population: sim.stats().details(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!(
                "seed={} steps={} outcome={} population=[{}]",
                row.seed, row.steps, row.outcome, row.population
            );
        }
    }
    Ok(())
}
