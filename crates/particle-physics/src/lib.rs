//! # Particle Physics
//!
//! Particle state, simulation constants and the pairwise attraction model for a
//! bounded 2D plane. The sequential integrator in [`integrator`] is the
//! reference semantics every other execution path must reproduce.

pub mod constants;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod particle;

pub use constants::*;
pub use error::*;
pub use forces::*;
pub use integrator::*;
pub use particle::*;
