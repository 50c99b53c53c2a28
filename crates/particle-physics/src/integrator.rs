//! Sequential force integration
//!
//! Every acceleration for a step is computed from the pre-step positions
//! before any particle moves, so the result does not depend on the order in
//! which particles are visited.

use crate::constants::{BOUNDARY_MAX, BOUNDARY_MIN};
use crate::forces::net_acceleration;
use crate::particle::ParticleStore;
use glam::Vec2;

/// Advance one particle's velocity then position by `delta_time` and clamp
/// the result to the domain.
///
/// Returns `(position, velocity)`.
pub fn integrate(
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    delta_time: f32,
) -> (Vec2, Vec2) {
    let velocity = velocity + acceleration * delta_time;
    let position = position + velocity * delta_time;

    let (x, vx) = clamp_axis(position.x, velocity.x);
    let (y, vy) = clamp_axis(position.y, velocity.y);

    (Vec2::new(x, y), Vec2::new(vx, vy))
}

/// Pin a coordinate into `[BOUNDARY_MIN, BOUNDARY_MAX]`, zeroing the
/// velocity on that axis if it had to move.
pub fn clamp_axis(position: f32, velocity: f32) -> (f32, f32) {
    if position < BOUNDARY_MIN {
        (BOUNDARY_MIN, 0.0)
    } else if position > BOUNDARY_MAX {
        (BOUNDARY_MAX, 0.0)
    } else {
        (position, velocity)
    }
}

/// Host-side integrator that steps a [`ParticleStore`] in place
///
/// Holds the acceleration staging array between steps so repeated steps
/// don't reallocate.
#[derive(Debug, Default)]
pub struct SequentialStepper {
    accelerations: Vec<Vec2>,
}

impl SequentialStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every particle by exactly one time step. O(N²).
    pub fn step(&mut self, store: &mut ParticleStore) {
        let constants = store.constants();
        let force_constant = constants.force_constant();
        let particles = store.particles();

        self.accelerations.clear();
        self.accelerations.extend(particles.iter().map(|subject| {
            let others = particles
                .iter()
                .filter(|other| other.id != subject.id)
                .map(|other| other.position);
            net_acceleration(subject.position, others, force_constant)
        }));

        for (particle, acceleration) in store.particles_mut().iter_mut().zip(&self.accelerations) {
            let (position, velocity) = integrate(
                particle.position,
                particle.velocity,
                *acceleration,
                constants.delta_time(),
            );
            particle.position = position;
            particle.velocity = velocity;
        }
    }

    /// Accelerations computed during the most recent step, indexed like the store
    pub fn last_accelerations(&self) -> &[Vec2] {
        &self.accelerations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::SimulationConstants;

    fn two_body(a: Vec2, b: Vec2) -> ParticleStore {
        ParticleStore::from_states([(a, Vec2::ZERO), (b, Vec2::ZERO)])
    }

    fn assert_all_finite(store: &ParticleStore) {
        for p in store.particles() {
            assert!(p.position.is_finite(), "position {:?}", p.position);
            assert!(p.velocity.is_finite(), "velocity {:?}", p.velocity);
        }
    }

    #[test]
    fn test_clamp_axis() {
        assert_eq!(clamp_axis(0.0, -0.3), (BOUNDARY_MIN, 0.0));
        assert_eq!(clamp_axis(1.2, 0.3), (BOUNDARY_MAX, 0.0));
        assert_eq!(clamp_axis(0.5, 0.3), (0.5, 0.3));
        assert_eq!(clamp_axis(BOUNDARY_MIN, 0.3), (BOUNDARY_MIN, 0.3));
    }

    #[test]
    fn test_two_body_scenario() {
        let mut store = two_body(Vec2::new(0.5, 0.5), Vec2::new(0.6, 0.5));
        store.set_constants(0.01, 5.0e-9).unwrap();

        SequentialStepper::new().step(&mut store);

        let a = store.particles()[0];
        let b = store.particles()[1];
        assert!(a.velocity.x > 0.0);
        assert!(b.velocity.x < 0.0);
        assert_eq!(a.velocity.y, 0.0);
        assert_eq!(b.velocity.y, 0.0);
        assert!((a.position - Vec2::new(0.5, 0.5)).length() < 1e-6);
        assert!((b.position - Vec2::new(0.6, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_close_pair_does_not_accelerate() {
        for offset in [Vec2::new(0.0005, 0.0), Vec2::new(0.0, 0.0005)] {
            let a = Vec2::new(0.5, 0.5);
            let mut store = two_body(a, a + offset);
            let mut stepper = SequentialStepper::new();
            stepper.step(&mut store);

            assert_eq!(stepper.last_accelerations(), &[Vec2::ZERO, Vec2::ZERO]);
            assert_eq!(store.particles()[0].velocity, Vec2::ZERO);
            assert_eq!(store.particles()[1].velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_adversarial_inputs_stay_finite() {
        let mut stepper = SequentialStepper::new();

        // Coincident
        let mut store = two_body(Vec2::new(0.4, 0.4), Vec2::new(0.4, 0.4));
        store.set_constants(0.01, 1.0).unwrap();
        stepper.step(&mut store);
        assert_all_finite(&store);

        // Differ in one axis only, strong force so the cap engages
        for (a, b) in [
            (Vec2::new(0.3, 0.5), Vec2::new(0.3015, 0.5)),
            (Vec2::new(0.5, 0.3), Vec2::new(0.5, 0.3015)),
        ] {
            let mut store = two_body(a, b);
            store.set_constants(0.01, 1.0).unwrap();
            for _ in 0..10 {
                stepper.step(&mut store);
                assert_all_finite(&store);
            }
        }
    }

    #[test]
    fn test_boundary_clamp_is_a_fixed_point() {
        let mut store = ParticleStore::from_states([(Vec2::new(0.0, 0.5), Vec2::ZERO)]);
        let mut stepper = SequentialStepper::new();

        stepper.step(&mut store);
        let p = store.particles()[0];
        assert_eq!(p.position.x, BOUNDARY_MIN);
        assert_eq!(p.velocity.x, 0.0);

        for _ in 0..5 {
            stepper.step(&mut store);
            assert_eq!(store.particles()[0], p);
        }
    }

    #[test]
    fn test_upper_boundary_zeroes_velocity() {
        let mut store =
            ParticleStore::from_states([(Vec2::new(0.5, 0.949), Vec2::new(0.02, 0.5))]);
        SequentialStepper::new().step(&mut store);

        let p = store.particles()[0];
        assert_eq!(p.position.y, BOUNDARY_MAX);
        assert_eq!(p.velocity.y, 0.0);
        // The other axis is untouched by the clamp
        assert_eq!(p.velocity.x, 0.02);
    }

    #[test]
    fn test_empty_store_steps() {
        let mut store = ParticleStore::from_states(std::iter::empty());
        let mut stepper = SequentialStepper::new();
        stepper.step(&mut store);
        assert!(store.is_empty());
        assert!(stepper.last_accelerations().is_empty());
    }

    #[test]
    fn test_single_particle_drifts() {
        let velocity = Vec2::new(0.01, -0.02);
        let mut store = ParticleStore::from_states([(Vec2::new(0.5, 0.5), velocity)]);
        let dt = store.constants().delta_time();
        let mut stepper = SequentialStepper::new();

        let mut expected = Vec2::new(0.5, 0.5);
        for _ in 0..10 {
            stepper.step(&mut store);
            expected += velocity * dt;
            assert_eq!(stepper.last_accelerations(), &[Vec2::ZERO]);
            assert_eq!(store.particles()[0].velocity, velocity);
            assert_eq!(store.particles()[0].position, expected);
        }
    }

    #[test]
    fn test_step_is_independent_of_visit_order() {
        let forward = ParticleStore::initialize(40, Some(99))
            .with_constants(SimulationConstants::new(0.01, 1.0e-5).unwrap());
        let states = forward.particles().iter().map(|p| (p.position, p.velocity));
        let reversed = ParticleStore::from_states(states.rev().collect::<Vec<_>>())
            .with_constants(forward.constants());

        let mut forward = forward;
        let mut reversed = reversed;
        let mut stepper = SequentialStepper::new();
        stepper.step(&mut forward);
        stepper.step(&mut reversed);

        let n = forward.len();
        for i in 0..n {
            let a = forward.particles()[i];
            let b = reversed.particles()[n - 1 - i];
            // Summation order differs, so allow for float reassociation
            assert!((a.position - b.position).length() < 1e-6);
            assert!((a.velocity - b.velocity).length() < 1e-5);
        }
    }
}
