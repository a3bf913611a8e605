use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::prelude::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};

// Define modules used by main
mod host;
mod pointer;
mod scenario;
mod sink;

use host::Host;
use particle_common::{MonotonicClock, SimulationConfig, World};
use pointer::OrbitingPointer;
use scenario::Scenario;
use sink::{FrameSink, JsonLinesSink, LogSink};

/// Command-line arguments for the headless particle engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a config.toml; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which preset to run
    #[arg(short, long, value_enum, default_value_t = Scenario::Orbit)]
    scenario: Scenario,

    /// Wall-clock seconds to run for
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Delete particles that leave the world on both axes, checked every frame
    #[arg(long)]
    cull_offscreen: bool,

    /// Write every frame to stdout as a JSON line instead of logging summaries
    #[arg(long)]
    json: bool,

    /// Seed for randomised scenarios
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Angular speed of the scripted pointer, in radians per second
    #[arg(long, default_value_t = 1.0)]
    pointer_speed: f64,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Starting Particle Engine (headless)...");

    // --- Load Configuration ---
    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
        None => {
            info!("No config file given, using built-in defaults.");
            SimulationConfig::default()
        }
    };
    debug!("Configuration: {:#?}", config);

    let run_time = Duration::try_from_secs_f64(args.seconds)
        .with_context(|| format!("--seconds must be a non-negative number, got {}", args.seconds))?;

    // --- Initialize World ---
    let params = config.get_sim_params()?;
    let pointer = OrbitingPointer::new(params.bounds, args.pointer_speed);
    let mut world = World::from_config(&config, Box::new(MonotonicClock::new()), Box::new(pointer))
        .context("Failed to build world from configuration")?;
    info!(
        "World {:.0}x{:.0}, {:.0} ticks/s, {:.0} frames/s, time scale {}.",
        params.bounds.width(),
        params.bounds.height(),
        config.timing.tick_rate_hz,
        config.timing.frame_rate_hz,
        params.time_scale
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    args.scenario.populate(&mut world, &mut rng)?;

    // --- Simulation Loop ---
    let sink: Box<dyn FrameSink> = if args.json {
        Box::new(JsonLinesSink::new(std::io::stdout().lock()))
    } else {
        // Roughly one summary per second of frames.
        Box::new(LogSink::new(config.timing.frame_rate_hz.round().max(1.0) as u64))
    };
    let mut host = Host::new(world, sink, Instant::now(), args.cull_offscreen);
    host.run_for(run_time)?;

    info!("Simulation Complete.");
    Ok(())
}
