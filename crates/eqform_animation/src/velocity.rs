//! Velocity-derived move durations
//!
//! When a transition gives no explicit move duration, the time is taken
//! from fixed velocity caps: each component of the transform change is
//! divided by its cap and the slowest component of the slowest element
//! wins.

use eqform_core::Transform;
use serde::{Deserialize, Serialize};

/// Velocity caps for translation, rotation and scale changes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityLimits {
    /// Equation units per second, per axis
    pub translation: f32,
    /// Radians per second
    pub rotation: f32,
    /// Scale factor change per second, per axis
    pub scale: f32,
}

impl Default for VelocityLimits {
    fn default() -> Self {
        Self {
            translation: 0.35,
            rotation: std::f32::consts::PI / 3.0,
            scale: 0.4,
        }
    }
}

impl VelocityLimits {
    pub fn new(translation: f32, rotation: f32, scale: f32) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Time needed to go from `from` to `to` without exceeding any cap
    pub fn move_time(&self, from: &Transform, to: &Transform) -> f32 {
        let component = |delta: f32, cap: f32| {
            if delta == 0.0 || cap <= 0.0 {
                0.0
            } else {
                delta.abs() / cap
            }
        };
        [
            component(to.translation.x - from.translation.x, self.translation),
            component(to.translation.y - from.translation.y, self.translation),
            component(to.rotation - from.rotation, self.rotation),
            component(to.scale.x - from.scale.x, self.scale),
            component(to.scale.y - from.scale.y, self.scale),
        ]
        .into_iter()
        .fold(0.0, f32::max)
    }

    /// Slowest move time over a set of start/end pairs
    pub fn max_move_time<'a, I>(&self, moves: I) -> f32
    where
        I: IntoIterator<Item = (&'a Transform, &'a Transform)>,
    {
        moves
            .into_iter()
            .map(|(from, to)| self.move_time(from, to))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqform_core::Point;

    #[test]
    fn test_translation_dominates() {
        let limits = VelocityLimits::default();
        let from = Transform::IDENTITY;
        let to = Transform::from_translation(Point::new(0.7, 0.0));
        assert!((limits.move_time(&from, &to) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_slowest_component_and_element_win() {
        let limits = VelocityLimits::default();
        let a0 = Transform::IDENTITY;
        let a1 = Transform::from_translation(Point::new(0.035, 0.0)).with_scale(1.4);
        let b0 = Transform::IDENTITY;
        let b1 = Transform::IDENTITY.with_rotation(std::f32::consts::PI);

        assert!((limits.move_time(&a0, &a1) - 1.0).abs() < 1e-5);
        let t = limits.max_move_time([(&a0, &a1), (&b0, &b1)]);
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_no_change_takes_no_time() {
        let limits = VelocityLimits::default();
        let t = Transform::from_translation(Point::new(0.1, 0.1));
        assert_eq!(limits.move_time(&t, &t), 0.0);
        assert_eq!(limits.max_move_time(std::iter::empty()), 0.0);
    }
}
