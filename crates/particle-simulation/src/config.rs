//! Simulation configuration

use crate::kernel::KernelSource;
use particle_physics::{DEFAULT_DELTA_TIME, DEFAULT_FORCE_CONSTANT, DEFAULT_PARTICLE_COUNT};
use std::time::Duration;

/// Which integrator realization a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Host loop over the particle store
    Sequential,
    /// Compute kernel on a wgpu device
    #[default]
    Gpu,
    /// Kernel formula run in software over the interchange buffer
    Emulated,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub particle_count: usize,
    /// Fixed seed for a reproducible initial population
    pub seed: Option<u64>,
    pub delta_time: f32,
    pub force_constant: f32,
    pub backend: BackendKind,
    pub kernel: KernelSource,
    /// Upper bound on each blocking wait for the compute device
    pub dispatch_timeout: Duration,
    /// Use the sequential realization if the GPU backend cannot be built
    pub fallback_to_sequential: bool,
    /// Log the average step time every [`crate::STATS_WINDOW`] steps
    pub report_statistics: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: None,
            delta_time: DEFAULT_DELTA_TIME,
            force_constant: DEFAULT_FORCE_CONSTANT,
            backend: BackendKind::Gpu,
            kernel: KernelSource::Builtin,
            dispatch_timeout: Duration::from_secs(10),
            fallback_to_sequential: false,
            report_statistics: true,
        }
    }
}

impl SimulationConfig {
    pub fn with_particle_count(mut self, particle_count: usize) -> Self {
        self.particle_count = particle_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_constants(mut self, delta_time: f32, force_constant: f32) -> Self {
        self.delta_time = delta_time;
        self.force_constant = force_constant;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_kernel(mut self, kernel: KernelSource) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    pub fn with_fallback(mut self, fallback_to_sequential: bool) -> Self {
        self.fallback_to_sequential = fallback_to_sequential;
        self
    }

    pub fn with_statistics(mut self, report_statistics: bool) -> Self {
        self.report_statistics = report_statistics;
        self
    }
}
