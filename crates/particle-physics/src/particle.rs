//! Particle types and the particle store

use crate::constants::*;
use crate::error::{PhysicsError, Result};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A point mass on the unit square
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Unique within a run; only used to exclude self-interaction
    pub id: u32,
    /// Location within the domain, `[0, 1]` on each axis
    pub position: Vec2,
    /// Domain units per unit time
    pub velocity: Vec2,
}

impl Particle {
    pub fn new(id: u32, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
        }
    }
}

/// GPU-compatible particle record
///
/// Matches the WGSL `Particle` struct: four `f32`s in the order
/// position-x, position-y, velocity-x, velocity-y (16 bytes, no padding).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PackedParticle {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
}

impl PackedParticle {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from_array(self.velocity)
    }
}

impl From<&Particle> for PackedParticle {
    fn from(particle: &Particle) -> Self {
        Self::new(particle.position, particle.velocity)
    }
}

/// Time step and force constant shared by every particle's update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConstants {
    delta_time: f32,
    force_constant: f32,
}

impl SimulationConstants {
    /// Both values must be positive and finite.
    pub fn new(delta_time: f32, force_constant: f32) -> Result<Self> {
        Ok(Self {
            delta_time: validate("delta_time", delta_time)?,
            force_constant: validate("force_constant", force_constant)?,
        })
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn force_constant(&self) -> f32 {
        self.force_constant
    }
}

impl Default for SimulationConstants {
    fn default() -> Self {
        Self {
            delta_time: DEFAULT_DELTA_TIME,
            force_constant: DEFAULT_FORCE_CONSTANT,
        }
    }
}

fn validate(name: &'static str, value: f32) -> Result<f32> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(PhysicsError::InvalidConstant { name, value })
    }
}

/// Authoritative state of every particle in one simulation run
///
/// The particle count is fixed at construction. Particle `i` always sits at
/// index `i` and carries `id == i`.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    constants: SimulationConstants,
}

impl ParticleStore {
    /// Create `count` particles with random positions in `[0, 1)²` and
    /// velocities in `[-0.05, 0.05)²`.
    ///
    /// A fixed `seed` makes the population reproducible.
    pub fn initialize(count: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let particles = (0..count)
            .map(|i| {
                let position = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
                let velocity = Vec2::new(
                    (rng.random::<f32>() - 0.5) * INITIAL_VELOCITY_SPREAD,
                    (rng.random::<f32>() - 0.5) * INITIAL_VELOCITY_SPREAD,
                );
                Particle::new(i as u32, position, velocity)
            })
            .collect::<Vec<_>>();

        log::info!("Initialized {} particles (seed: {:?})", count, seed);

        Self {
            particles,
            constants: SimulationConstants::default(),
        }
    }

    /// Build a store from explicit `(position, velocity)` pairs, assigning
    /// identities in iteration order.
    pub fn from_states(states: impl IntoIterator<Item = (Vec2, Vec2)>) -> Self {
        let particles = states
            .into_iter()
            .enumerate()
            .map(|(i, (position, velocity))| Particle::new(i as u32, position, velocity))
            .collect();

        Self {
            particles,
            constants: SimulationConstants::default(),
        }
    }

    /// Set the time step and force constant. Must be called before the first
    /// step; rejects non-positive or non-finite values.
    pub fn set_constants(&mut self, delta_time: f32, force_constant: f32) -> Result<()> {
        self.constants = SimulationConstants::new(delta_time, force_constant)?;
        Ok(())
    }

    pub fn with_constants(mut self, constants: SimulationConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn constants(&self) -> SimulationConstants {
        self.constants
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Positions only, for the renderer
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec2> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
