//! Packed interchange buffer shared by the host and the compute kernel
//!
//! Particle `i` occupies bytes `[i * 16, i * 16 + 16)`: position-x,
//! position-y, velocity-x, velocity-y as native-order `f32`s.

use crate::error::{Result, SimulationError};
use particle_physics::{PackedParticle, ParticleStore};

/// Bytes per particle in the interchange layout
pub const PARTICLE_STRIDE: usize = std::mem::size_of::<PackedParticle>();

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterchangeBuffer {
    particles: Vec<PackedParticle>,
}

impl InterchangeBuffer {
    /// Pack every particle's position and velocity in store order.
    pub fn marshal(store: &ParticleStore) -> Self {
        let mut buffer = Self::default();
        buffer.refresh_from(store);
        buffer
    }

    /// Re-pack `store` into this buffer, reusing its allocation.
    pub fn refresh_from(&mut self, store: &ParticleStore) {
        self.particles.clear();
        self.particles
            .extend(store.particles().iter().map(PackedParticle::from));
    }

    /// Overwrite the position and velocity of every particle in `store`.
    ///
    /// Nothing is written unless the buffer covers exactly the store's
    /// particles.
    pub fn unmarshal_into(&self, store: &mut ParticleStore) -> Result<()> {
        if self.particles.len() != store.len() {
            return Err(SimulationError::BufferShape {
                expected: store.len(),
                actual: self.particles.len(),
            });
        }

        for (particle, packed) in store.particles_mut().iter_mut().zip(&self.particles) {
            particle.position = packed.position();
            particle.velocity = packed.velocity();
        }
        Ok(())
    }

    /// Replace the contents with particles decoded from `bytes` in the
    /// interchange layout. Trailing bytes short of a full particle are
    /// ignored. Returns the particle count.
    pub fn copy_from_bytes(&mut self, bytes: &[u8]) -> usize {
        self.particles.clear();
        self.particles.extend(
            bytes
                .chunks_exact(PARTICLE_STRIDE)
                .map(bytemuck::pod_read_unaligned::<PackedParticle>),
        );
        self.particles.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }

    pub fn particles(&self) -> &[PackedParticle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [PackedParticle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
