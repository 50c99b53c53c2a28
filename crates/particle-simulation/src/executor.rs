//! Parallel step executors
//!
//! An executor runs one data-parallel pass over an [`InterchangeBuffer`]:
//! work item `i` reads the whole pre-dispatch buffer and writes only particle
//! `i`'s updated state. Results are read back into the same buffer.

use crate::buffer::InterchangeBuffer;
use crate::error::BackendError;
use crate::params::KernelParams;
use particle_physics::{integrate, net_acceleration, PackedParticle};

/// A backend able to run the particle update kernel
///
/// `dispatch` blocks until the result is back in `buffer`. On error the
/// buffer contents are unspecified and must not be treated as a step result.
pub trait ParallelExecutor {
    /// Short name for logs
    fn name(&self) -> &str;

    fn dispatch(
        &mut self,
        buffer: &mut InterchangeBuffer,
        params: &KernelParams,
    ) -> Result<(), BackendError>;
}

impl<E: ParallelExecutor + ?Sized> ParallelExecutor for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dispatch(
        &mut self,
        buffer: &mut InterchangeBuffer,
        params: &KernelParams,
    ) -> Result<(), BackendError> {
        (**self).dispatch(buffer, params)
    }
}

/// Host-side equivalent of one kernel work item.
///
/// `input` is the full pre-dispatch buffer; only `index` is updated.
pub fn update_work_item(
    index: usize,
    input: &[PackedParticle],
    params: &KernelParams,
) -> PackedParticle {
    let subject = input[index];
    let others = input
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != index)
        .map(|(_, p)| p.position());

    let acceleration = net_acceleration(subject.position(), others, params.force_constant);
    let (position, velocity) = integrate(
        subject.position(),
        subject.velocity(),
        acceleration,
        params.delta_time,
    );
    PackedParticle::new(position, velocity)
}

/// Software executor that runs the kernel's formula work item by work item
/// without any device.
#[derive(Debug, Default)]
pub struct EmulatedExecutor {
    snapshot: Vec<PackedParticle>,
}

impl EmulatedExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParallelExecutor for EmulatedExecutor {
    fn name(&self) -> &str {
        "emulated"
    }

    fn dispatch(
        &mut self,
        buffer: &mut InterchangeBuffer,
        params: &KernelParams,
    ) -> Result<(), BackendError> {
        let count = params.particle_count as usize;
        if buffer.len() != count {
            return Err(BackendError::BufferShape {
                expected: count,
                actual: buffer.len(),
            });
        }

        self.snapshot.clear();
        self.snapshot.extend_from_slice(buffer.particles());

        for (index, out) in buffer.particles_mut().iter_mut().enumerate() {
            *out = update_work_item(index, &self.snapshot, params);
        }
        Ok(())
    }
}
