//! Kernel parameters uploaded alongside the particle buffer

use bytemuck::{Pod, Zeroable};
use particle_physics::SimulationConstants;

/// Uniform block for the particle update kernel (matches WGSL `KernelParams`)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct KernelParams {
    pub particle_count: u32,
    pub delta_time: f32,
    pub force_constant: f32,
    // Uniform blocks are sized in 16-byte units
    pub _padding: u32,
}

impl KernelParams {
    pub fn new(particle_count: u32, constants: SimulationConstants) -> Self {
        Self {
            particle_count,
            delta_time: constants.delta_time(),
            force_constant: constants.force_constant(),
            _padding: 0,
        }
    }
}
