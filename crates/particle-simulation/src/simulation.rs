//! Simulation session
//!
//! Owns the particle store and the integrator selected for the run. Steps run
//! strictly one after another; positions are only readable between steps
//! because stepping takes `&mut self`. Callers sharing a session across
//! threads wrap it in a single `Mutex` covering a step and the read after it.

use crate::config::{BackendKind, SimulationConfig};
use crate::error::Result;
use crate::executor::EmulatedExecutor;
use crate::gpu::GpuExecutor;
use crate::integrator::{Integrator, ParallelIntegrator, SequentialIntegrator};
use glam::Vec2;
use particle_physics::ParticleStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Steps per statistics report
pub const STATS_WINDOW: u32 = 100;

/// Rolling step-time average, reported once per [`STATS_WINDOW`] steps
#[derive(Debug, Default)]
struct StepStats {
    total: Duration,
    count: u32,
}

impl StepStats {
    /// Returns the window average when a window completes.
    fn record(&mut self, elapsed: Duration) -> Option<Duration> {
        self.total += elapsed;
        self.count += 1;
        if self.count < STATS_WINDOW {
            return None;
        }
        let average = self.total / self.count;
        *self = Self::default();
        Some(average)
    }
}

pub struct Simulation {
    store: ParticleStore,
    integrator: Box<dyn Integrator>,
    steps_taken: u64,
    stats: StepStats,
    report_statistics: bool,
}

impl Simulation {
    /// Validate the constants, create the initial population and build the
    /// configured integrator.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let mut store = ParticleStore::initialize(config.particle_count, config.seed);
        store.set_constants(config.delta_time, config.force_constant)?;

        let integrator = build_integrator(config, store.len())?;
        log::info!(
            "Simulating {} particles with the {} integrator (dt={}, G={})",
            store.len(),
            integrator.name(),
            config.delta_time,
            config.force_constant
        );

        Ok(Self::from_parts(store, integrator).with_statistics(config.report_statistics))
    }

    pub fn from_parts(store: ParticleStore, integrator: Box<dyn Integrator>) -> Self {
        Self {
            store,
            integrator,
            steps_taken: 0,
            stats: StepStats::default(),
            report_statistics: false,
        }
    }

    pub fn with_statistics(mut self, report_statistics: bool) -> Self {
        self.report_statistics = report_statistics;
        self
    }

    /// Advance one time step. Blocks for the full dispatch and read-back on
    /// parallel backends.
    pub fn step(&mut self) -> Result<()> {
        let start = Instant::now();
        self.integrator.step(&mut self.store)?;
        self.steps_taken += 1;

        if let Some(average) = self.stats.record(start.elapsed()) {
            if self.report_statistics {
                log::info!(
                    "Average time per step over {} steps: {:.3} ms",
                    STATS_WINDOW,
                    average.as_secs_f64() * 1000.0
                );
            }
        }
        Ok(())
    }

    /// Advance exactly `steps` steps, stopping at the first error.
    pub fn advance(&mut self, steps: u64) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Step until `cancel` is set or `limit` steps have run. The flag is
    /// checked before every step. Returns the number of steps taken.
    pub fn advance_until_cancelled(
        &mut self,
        cancel: &AtomicBool,
        limit: Option<u64>,
    ) -> Result<u64> {
        let mut taken = 0;
        while !cancel.load(Ordering::Relaxed) && limit.is_none_or(|limit| taken < limit) {
            self.step()?;
            taken += 1;
        }
        Ok(taken)
    }

    /// Current positions in `[0, 1]²`, for rendering between steps
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec2> + '_ {
        self.store.positions()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn backend_name(&self) -> &str {
        self.integrator.name()
    }
}

fn build_integrator(
    config: &SimulationConfig,
    particle_count: usize,
) -> Result<Box<dyn Integrator>> {
    let integrator: Box<dyn Integrator> = match config.backend {
        BackendKind::Sequential => Box::new(SequentialIntegrator::new()),
        BackendKind::Emulated => Box::new(ParallelIntegrator::new(EmulatedExecutor::new())),
        BackendKind::Gpu => {
            match GpuExecutor::new(particle_count, &config.kernel, config.dispatch_timeout) {
                Ok(executor) => Box::new(ParallelIntegrator::new(executor)),
                Err(error) if config.fallback_to_sequential => {
                    log::warn!(
                        "GPU backend unavailable ({}), falling back to sequential integration",
                        error
                    );
                    Box::new(SequentialIntegrator::new())
                }
                Err(error) => return Err(error.into()),
            }
        }
    };
    Ok(integrator)
}
