//! Pairwise attraction between unit-mass particles
//!
//! The WGSL kernel in `particle-simulation` mirrors these functions line for
//! line; keep them in sync.

use crate::constants::*;
use glam::Vec2;

/// Acceleration imparted on a particle at `subject` by one at `other`.
///
/// Magnitude is `G / r²` capped at [`MAX_PAIR_ACCELERATION`]. Pairs at or
/// below [`MIN_INTERACTION_DISTANCE`] contribute nothing. Exactly equal
/// coordinates resolve to direction -1 on that axis.
pub fn pair_acceleration(subject: Vec2, other: Vec2, force_constant: f32) -> Vec2 {
    let dx = (other.x - subject.x).abs();
    let dy = (other.y - subject.y).abs();
    let distance = (dx * dx + dy * dy).sqrt();

    if distance <= MIN_INTERACTION_DISTANCE {
        return Vec2::ZERO;
    }

    let x_direction = if other.x > subject.x { 1.0 } else { -1.0 };
    let y_direction = if other.y > subject.y { 1.0 } else { -1.0 };

    let magnitude = (force_constant / (distance * distance)).min(MAX_PAIR_ACCELERATION);

    // dx / distance can land just above 1.0 after rounding, outside acos's domain
    let ratio = (dx / distance).min(1.0);
    let angle = ratio.acos();

    Vec2::new(
        x_direction * angle.cos() * magnitude,
        y_direction * angle.sin() * magnitude,
    )
}

/// Sum of [`pair_acceleration`] over `others`, accumulated in iteration order.
///
/// The caller excludes the subject itself.
pub fn net_acceleration(
    subject: Vec2,
    others: impl IntoIterator<Item = Vec2>,
    force_constant: f32,
) -> Vec2 {
    others.into_iter().fold(Vec2::ZERO, |acc, other| {
        acc + pair_acceleration(subject, other, force_constant)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const G: f32 = DEFAULT_FORCE_CONSTANT;

    #[test]
    fn test_close_pair_contributes_nothing() {
        let a = Vec2::new(0.5, 0.5);
        assert_eq!(pair_acceleration(a, Vec2::new(0.5005, 0.5), G), Vec2::ZERO);
        assert_eq!(pair_acceleration(a, Vec2::new(0.5, 0.5005), G), Vec2::ZERO);
        assert_eq!(pair_acceleration(a, a, G), Vec2::ZERO);
    }

    #[test]
    fn test_points_toward_other() {
        let a = Vec2::new(0.5, 0.5);
        let b = Vec2::new(0.6, 0.5);

        let on_a = pair_acceleration(a, b, G);
        let on_b = pair_acceleration(b, a, G);

        assert!(on_a.x > 0.0);
        assert!(on_b.x < 0.0);
        assert_eq!(on_a.y, 0.0);
        assert_eq!(on_b.y, 0.0);
    }

    #[test]
    fn test_pair_symmetry() {
        let a = Vec2::new(0.21, 0.37);
        let b = Vec2::new(0.64, 0.82);

        let on_a = pair_acceleration(a, b, G);
        let on_b = pair_acceleration(b, a, G);

        assert_eq!(on_a.length(), on_b.length());
        assert_eq!(on_a, -on_b);
    }

    #[test]
    fn test_magnitude_follows_inverse_square() {
        let a = Vec2::new(0.2, 0.2);
        let b = Vec2::new(0.5, 0.6); // distance 0.5
        let acc = pair_acceleration(a, b, G);
        assert_relative_eq!(acc.length(), G / 0.25, max_relative = 1e-4);
        assert_relative_eq!(acc.x / acc.length(), 0.6, max_relative = 1e-4);
        assert_relative_eq!(acc.y / acc.length(), 0.8, max_relative = 1e-4);
    }

    #[test]
    fn test_magnitude_is_capped() {
        let a = Vec2::new(0.5, 0.5);
        let b = Vec2::new(0.502, 0.5);
        let acc = pair_acceleration(a, b, 1.0);
        assert_relative_eq!(acc.length(), MAX_PAIR_ACCELERATION, max_relative = 1e-6);
    }

    #[test]
    fn test_axis_aligned_pairs_stay_finite() {
        // dy == 0 drives dx / distance to exactly 1; dx == 0 drives it to 0
        let a = Vec2::new(0.3, 0.3);
        for other in [
            Vec2::new(0.7, 0.3),
            Vec2::new(0.3, 0.7),
            Vec2::new(0.1, 0.3),
            Vec2::new(0.3, 0.1),
        ] {
            let acc = pair_acceleration(a, other, 1.0e-3);
            assert!(acc.is_finite(), "non-finite acceleration toward {other:?}");
        }
    }

    #[test]
    fn test_equal_coordinate_resolves_negative() {
        // Same x: direction resolves to -1 and the x component is only acos/cos rounding
        let a = Vec2::new(0.5, 0.2);
        let b = Vec2::new(0.5, 0.8);
        let acc = pair_acceleration(a, b, G);
        assert!(acc.y > 0.0);
        assert!(acc.x.abs() < acc.y * 1e-6);
    }

    #[test]
    fn test_net_acceleration_cancels_for_mirrored_pair() {
        let subject = Vec2::new(0.5, 0.5);
        let others = [Vec2::new(0.3, 0.5), Vec2::new(0.7, 0.5)];
        let acc = net_acceleration(subject, others, G);
        assert_relative_eq!(acc.x, 0.0, epsilon = 1e-12);
        assert_eq!(acc.y, 0.0);
    }

    #[test]
    fn test_net_acceleration_of_nothing_is_zero() {
        assert_eq!(net_acceleration(Vec2::new(0.5, 0.5), std::iter::empty(), G), Vec2::ZERO);
    }
}
