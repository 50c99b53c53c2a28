//! Attractive Particle Simulation
//!
//! Headless driver: advances a 2D gravity-like particle system on the chosen
//! backend and optionally writes the final positions as a greyscale frame.

mod frame;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use frame::{Frame, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use particle_physics::{DEFAULT_DELTA_TIME, DEFAULT_FORCE_CONSTANT, DEFAULT_PARTICLE_COUNT};
use particle_simulation::{BackendKind, KernelSource, Simulation, SimulationConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Sequential,
    Gpu,
    Emulated,
}

impl From<Backend> for BackendKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sequential => BackendKind::Sequential,
            Backend::Gpu => BackendKind::Gpu,
            Backend::Emulated => BackendKind::Emulated,
        }
    }
}

/// Simulate mutually attracting particles in the unit square.
#[derive(Parser)]
#[command(name = "particle-gravity")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of particles
    #[arg(short, long, default_value_t = DEFAULT_PARTICLE_COUNT)]
    particles: usize,

    /// Number of time steps to run
    #[arg(short, long, default_value_t = 1000)]
    steps: u64,

    /// Seed for a reproducible initial population
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_DELTA_TIME)]
    delta_time: f32,

    /// Gravitational coupling constant G
    #[arg(long, default_value_t = DEFAULT_FORCE_CONSTANT)]
    force_constant: f32,

    #[arg(short, long, value_enum, default_value_t = Backend::Gpu)]
    backend: Backend,

    /// WGSL kernel to load instead of the built-in one
    #[arg(short, long)]
    kernel: Option<PathBuf>,

    /// Upper bound on each wait for the compute device, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Use the sequential integrator if the GPU backend fails to start
    #[arg(long)]
    fallback: bool,

    /// Don't log step-time statistics
    #[arg(short, long)]
    quiet_stats: bool,

    /// Write the final positions to this path as a binary PGM image
    #[arg(short, long)]
    frame: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        let kernel = match &self.kernel {
            Some(path) => KernelSource::File(path.clone()),
            None => KernelSource::Builtin,
        };
        let mut config = SimulationConfig::default()
            .with_particle_count(self.particles)
            .with_constants(self.delta_time, self.force_constant)
            .with_backend(self.backend.into())
            .with_kernel(kernel)
            .with_dispatch_timeout(Duration::from_millis(self.timeout_ms))
            .with_fallback(self.fallback)
            .with_statistics(!self.quiet_stats);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("Starting attractive particle simulation...");

    let mut simulation =
        Simulation::new(&cli.config()).context("failed to set up the simulation")?;
    log::info!("✓ Simulation initialized ({} backend)", simulation.backend_name());

    let start = Instant::now();
    simulation
        .advance(cli.steps)
        .with_context(|| format!("step {} failed", simulation.steps_taken() + 1))?;
    log::info!(
        "✓ Ran {} steps in {:.2} s",
        simulation.steps_taken(),
        start.elapsed().as_secs_f64()
    );

    if let Some(path) = &cli.frame {
        let mut frame = Frame::new(cli.width, cli.height);
        frame.draw(simulation.positions());
        frame
            .save_pgm(path)
            .with_context(|| format!("failed to write frame to {}", path.display()))?;
        log::info!("✓ Wrote final frame to {}", path.display());
    }

    Ok(())
}
