//! Physical constants for the particle simulation
//!
//! Positions are normalized to the unit square and every particle has an
//! implicit mass of 1, so the force constant directly scales acceleration.

/// Default time step advanced per update
pub const DEFAULT_DELTA_TIME: f32 = 0.01;

/// Default force constant (pre-scaled for unit masses)
pub const DEFAULT_FORCE_CONSTANT: f32 = 5.0e-9;

/// Default population size
pub const DEFAULT_PARTICLE_COUNT: usize = 500;

/// Pairs closer than this contribute no force
pub const MIN_INTERACTION_DISTANCE: f32 = 0.001;

/// Cap on the acceleration a single pair can contribute
pub const MAX_PAIR_ACCELERATION: f32 = 1.0;

/// Lower clamp for positions on both axes
pub const BOUNDARY_MIN: f32 = 0.05;

/// Upper clamp for positions on both axes
pub const BOUNDARY_MAX: f32 = 0.95;

/// Width of the initial velocity distribution, centred on zero.
/// Velocities are drawn from `[-SPREAD / 2, SPREAD / 2)`.
pub const INITIAL_VELOCITY_SPREAD: f32 = 0.1;
