//! # Particle Simulation Engine
//!
//! Steps a [`particle_physics::ParticleStore`] either sequentially on the host
//! or through a data-parallel kernel over a packed interchange buffer, on a
//! wgpu compute device or in software.

pub mod buffer;
pub mod config;
pub mod error;
pub mod executor;
pub mod gpu;
pub mod integrator;
pub mod kernel;
pub mod params;
pub mod simulation;

pub use buffer::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use gpu::*;
pub use integrator::*;
pub use kernel::*;
pub use params::*;
pub use simulation::*;
