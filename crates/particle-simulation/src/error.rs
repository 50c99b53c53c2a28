//! Error types for particle-simulation.

use particle_physics::PhysicsError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of the parallel compute backend, by stage
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no compatible compute adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create compute device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to read kernel source {path}: {source}")]
    KernelSource {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("kernel failed to compile: {0}")]
    KernelCompile(String),

    #[error("dispatch rejected by device: {0}")]
    Dispatch(String),

    #[error("device poll failed: {0}")]
    Poll(wgpu::PollError),

    #[error("device did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to map read-back buffer: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("buffer holds {actual} particles, backend was built for {expected}")]
    BufferShape { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[error("parallel backend failed: {0}")]
    Backend(#[from] BackendError),

    #[error("interchange buffer holds {actual} particles, store holds {expected}")]
    BufferShape { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
