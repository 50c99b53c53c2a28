//! Force integrator realizations
//!
//! Both realizations advance a [`ParticleStore`] by one step with the same
//! semantics. Pick one per run.

use crate::buffer::InterchangeBuffer;
use crate::error::Result;
use crate::executor::ParallelExecutor;
use crate::params::KernelParams;
use particle_physics::{ParticleStore, SequentialStepper};

pub trait Integrator {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Advance every particle in `store` by one time step.
    ///
    /// On error the store still holds the pre-step state.
    fn step(&mut self, store: &mut ParticleStore) -> Result<()>;
}

/// Host-executed realization operating directly on the store
#[derive(Debug, Default)]
pub struct SequentialIntegrator {
    stepper: SequentialStepper,
}

impl SequentialIntegrator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Integrator for SequentialIntegrator {
    fn name(&self) -> &str {
        "sequential"
    }

    fn step(&mut self, store: &mut ParticleStore) -> Result<()> {
        self.stepper.step(store);
        Ok(())
    }
}

/// Data-parallel realization: marshal, dispatch, unmarshal
pub struct ParallelIntegrator<E> {
    executor: E,
    buffer: InterchangeBuffer,
}

impl<E: ParallelExecutor> ParallelIntegrator<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            buffer: InterchangeBuffer::default(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: ParallelExecutor> Integrator for ParallelIntegrator<E> {
    fn name(&self) -> &str {
        self.executor.name()
    }

    fn step(&mut self, store: &mut ParticleStore) -> Result<()> {
        let params = KernelParams::new(store.len() as u32, store.constants());

        self.buffer.refresh_from(store);
        self.executor.dispatch(&mut self.buffer, &params)?;
        // Read-back is the only authority for the post-step state
        self.buffer.unmarshal_into(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, SimulationError};
    use crate::executor::EmulatedExecutor;
    use glam::Vec2;

    /// Scribbles over the buffer, then fails
    struct FailingExecutor;

    impl ParallelExecutor for FailingExecutor {
        fn name(&self) -> &str {
            "failing"
        }

        fn dispatch(
            &mut self,
            buffer: &mut InterchangeBuffer,
            _params: &KernelParams,
        ) -> std::result::Result<(), BackendError> {
            for packed in buffer.particles_mut() {
                packed.position = [f32::NAN; 2];
            }
            Err(BackendError::Dispatch("device lost".into()))
        }
    }

    /// Returns one particle too few
    struct TruncatingExecutor;

    impl ParallelExecutor for TruncatingExecutor {
        fn name(&self) -> &str {
            "truncating"
        }

        fn dispatch(
            &mut self,
            buffer: &mut InterchangeBuffer,
            _params: &KernelParams,
        ) -> std::result::Result<(), BackendError> {
            let bytes = buffer.as_bytes().to_vec();
            buffer.copy_from_bytes(&bytes[..bytes.len() - 16]);
            Ok(())
        }
    }

    #[test]
    fn test_realizations_agree() {
        let store = ParticleStore::initialize(50, Some(21));
        let mut sequential_store = store.clone();
        let mut parallel_store = store;

        let mut sequential = SequentialIntegrator::new();
        let mut parallel = ParallelIntegrator::new(EmulatedExecutor::new());

        for _ in 0..10 {
            sequential.step(&mut sequential_store).unwrap();
            parallel.step(&mut parallel_store).unwrap();
        }

        for (a, b) in sequential_store
            .particles()
            .iter()
            .zip(parallel_store.particles())
        {
            assert!((a.position - b.position).abs().max_element() < 1e-4);
            assert!((a.velocity - b.velocity).abs().max_element() < 1e-4);
        }
    }

    #[test]
    fn test_failed_dispatch_leaves_store_untouched() {
        let mut store = ParticleStore::initialize(6, Some(2));
        let before = store.particles().to_vec();

        let err = ParallelIntegrator::new(FailingExecutor)
            .step(&mut store)
            .unwrap_err();

        assert!(matches!(
            err,
            SimulationError::Backend(BackendError::Dispatch(_))
        ));
        assert_eq!(store.particles(), before.as_slice());
    }

    #[test]
    fn test_short_read_back_is_rejected() {
        let mut store = ParticleStore::initialize(3, Some(2));
        let before = store.particles().to_vec();

        let err = ParallelIntegrator::new(TruncatingExecutor)
            .step(&mut store)
            .unwrap_err();

        assert!(matches!(
            err,
            SimulationError::BufferShape {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.particles(), before.as_slice());
    }

    #[test]
    fn test_single_particle_keeps_velocity() {
        let velocity = Vec2::new(0.01, 0.02);
        let mut store = ParticleStore::from_states([(Vec2::new(0.5, 0.5), velocity)]);
        let mut parallel = ParallelIntegrator::new(EmulatedExecutor::new());

        parallel.step(&mut store).unwrap();
        assert_eq!(store.particles()[0].velocity, velocity);
        assert!(store.particles()[0].position.x > 0.5);
        assert!(store.particles()[0].position.y > 0.5);
    }
}
