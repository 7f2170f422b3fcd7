//! Flapsim - single epoch runner
//!
//! Flies one population of built-in controllers through one epoch and
//! prints the fitness report. Ctrl-C stops the epoch early and still
//! reports what was accumulated.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use flapsim::brains::{indexed_population, Policy};
use flapsim::core::config::{load_config, SimulationConfig};
use flapsim::core::error::Result;
use flapsim::render::snapshot;
use flapsim::sim::context::{SimContext, StopSignal};
use flapsim::sim::epoch::Epoch;
use flapsim::sim::pacing::FramePacer;

/// Headless gap-flight arena
#[derive(Parser, Debug)]
#[command(name = "flapsim")]
#[command(about = "Run one epoch of the gap-flight arena and report fitness")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Controller for every agent: never, periodic, perceptron or gap
    #[arg(long, default_value = "gap")]
    policy: Policy,

    /// Number of agents
    #[arg(long, short = 'n', default_value_t = 20)]
    population: usize,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks (overrides the config file)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Pace ticks at 60 per second
    #[arg(long)]
    realtime: bool,

    /// Write one JSON snapshot per tick to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "flapsim=debug" } else { "flapsim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.max_ticks.is_some() {
        config.max_ticks = args.max_ticks;
    }

    // Ctrl-C is watched on the async runtime; the epoch itself stays on
    // this thread and only polls the flag.
    let rt = Runtime::new()?;
    let stop = StopSignal::new();
    {
        let stop = stop.clone();
        rt.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current tick");
                stop.request_stop();
            }
        });
    }

    let mut ctx = SimContext::new(config)?.with_stop(stop);
    tracing::info!(
        "Flapsim starting: {} x {} agents, seed {}",
        args.population,
        args.policy,
        ctx.config.seed
    );

    let mut brains = args.policy.build_population(args.population, ctx.config.seed);
    let population = indexed_population(&mut brains);

    let mut trace = match &args.trace {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };
    let mut pacer = args.realtime.then(FramePacer::default);
    let mut trace_error = None;

    let mut epoch = Epoch::new(population, &mut ctx);
    epoch.run_with(|e| {
        if trace_error.is_none() {
            if let Some(writer) = trace.as_mut() {
                if let Err(err) = write_frame(writer, e) {
                    trace_error = Some(err);
                }
            }
        }
        if let Some(pacer) = pacer.as_mut() {
            pacer.wait();
        }
    });
    let report = epoch.finish();

    if let Some(err) = trace_error {
        return Err(err);
    }
    if let Some(mut writer) = trace {
        writer.flush()?;
    }

    match args.format.as_str() {
        "text" => {
            println!("=== FLAPSIM ===");
            println!("{}", report.summary());
            println!();
            for (rank, result) in report.ranking().iter().take(10).enumerate() {
                println!(
                    "{:>3}. agent {:<4} fitness {:>8.1}  passed {:>3}  survived {:>5} ticks  {}",
                    rank + 1,
                    result.key,
                    result.fitness,
                    result.obstacles_passed,
                    result.ticks_survived,
                    result
                        .cause_of_death
                        .as_ref()
                        .map_or_else(|| "alive".to_string(), |cause| format!("{:?}", cause))
                );
            }
        }
        _ => println!("{}", report.to_json()?),
    }

    rt.shutdown_background();
    Ok(())
}

fn write_frame<W: Write>(writer: &mut W, epoch: &Epoch<'_, '_, usize>) -> Result<()> {
    serde_json::to_writer(&mut *writer, &snapshot(epoch))?;
    writeln!(writer)?;
    Ok(())
}
