//! Multi-seed sweep
//!
//! Runs one independent epoch per seed in parallel and summarizes how a
//! policy holds up across obstacle courses. Output is JSON for scripts.

use std::path::PathBuf;

use clap::Parser;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use flapsim::brains::{indexed_population, Policy};
use flapsim::core::config::{load_config, SimulationConfig};
use flapsim::core::error::Result;
use flapsim::sim::context::SimContext;
use flapsim::sim::epoch::{evaluate_in, Termination};

/// Evaluate a policy over many seeds
#[derive(Parser, Debug)]
#[command(name = "trial_sweep")]
#[command(about = "Run one epoch per seed in parallel and summarize fitness")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Controller for every agent: never, periodic, perceptron or gap
    #[arg(long, default_value = "gap")]
    policy: Policy,

    /// Agents per epoch
    #[arg(long, short = 'n', default_value_t = 20)]
    population: usize,

    /// Number of seeds to run
    #[arg(long, default_value_t = 32)]
    seeds: u64,

    /// First seed; the sweep covers `first_seed..first_seed + seeds`
    #[arg(long, default_value_t = 0)]
    first_seed: u64,

    /// Tick cutoff per epoch, so a perfect policy still finishes
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// Result of one seed
#[derive(Debug, Serialize)]
struct SeedOutcome {
    seed: u64,
    ticks: u64,
    best_fitness: f64,
    mean_fitness: f64,
    most_passed: u32,
    termination: Termination,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct SweepSummary {
    policy: String,
    population: usize,
    seeds: usize,
    mean_best_fitness: f64,
    worst_best_fitness: f64,
    best_seed: Option<u64>,
    outcomes: Vec<SeedOutcome>,
}

fn run_seed(base: &SimulationConfig, policy: Policy, population: usize, seed: u64) -> Result<SeedOutcome> {
    let mut config = base.clone();
    config.seed = seed;
    let mut ctx = SimContext::new(config)?;

    let mut brains = policy.build_population(population, seed);
    let report = evaluate_in(indexed_population(&mut brains), &mut ctx);

    Ok(SeedOutcome {
        seed,
        ticks: report.ticks,
        best_fitness: report.best().map(|r| r.fitness).unwrap_or(0.0),
        mean_fitness: report.mean_fitness(),
        most_passed: report.results.iter().map(|r| r.obstacles_passed).max().unwrap_or(0),
        termination: report.termination,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flapsim=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    config.max_ticks = Some(args.max_ticks);

    let seeds: Vec<u64> = (args.first_seed..args.first_seed + args.seeds).collect();
    tracing::info!("Sweeping {} seeds with {} x {}", seeds.len(), args.population, args.policy);

    let outcomes: Vec<SeedOutcome> = seeds
        .par_iter()
        .map(|&seed| run_seed(&config, args.policy, args.population, seed))
        .collect::<Result<Vec<_>>>()?;

    let bests: Vec<f64> = outcomes.iter().map(|o| o.best_fitness).collect();
    let summary = SweepSummary {
        policy: args.policy.to_string(),
        population: args.population,
        seeds: outcomes.len(),
        mean_best_fitness: if bests.is_empty() {
            0.0
        } else {
            bests.iter().sum::<f64>() / bests.len() as f64
        },
        worst_best_fitness: bests
            .iter()
            .copied()
            .min_by_key(|&b| OrderedFloat(b))
            .unwrap_or(0.0),
        best_seed: outcomes
            .iter()
            .max_by_key(|o| OrderedFloat(o.best_fitness))
            .map(|o| o.seed),
        outcomes,
    };

    match args.format.as_str() {
        "text" => {
            println!("=== TRIAL SWEEP: {} ===", summary.policy);
            for o in &summary.outcomes {
                println!(
                    "seed {:>6}: best {:>8.1}  mean {:>8.2}  passed {:>3}  {} ticks ({:?})",
                    o.seed, o.best_fitness, o.mean_fitness, o.most_passed, o.ticks, o.termination
                );
            }
            println!(
                "mean best {:.2}, worst best {:.1}, best seed {:?}",
                summary.mean_best_fitness, summary.worst_best_fitness, summary.best_seed
            );
        }
        _ => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}
