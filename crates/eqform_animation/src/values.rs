//! Animatable value types
//!
//! Linear interpolation for the values transitions animate, plus the
//! translation paths an element can follow while it moves.

use eqform_core::{Point, Transform};
use serde::{Deserialize, Serialize};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Point Implementation
// ============================================================================

impl Interpolate for Point {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Point::new(self.x.lerp(&other.x, t), self.y.lerp(&other.y, t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.approx_eq(&other.x, epsilon) && self.y.approx_eq(&other.y, epsilon)
    }
}

// ============================================================================
// Transform Implementation
// ============================================================================

impl Interpolate for Transform {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Transform::new(
            self.translation.lerp(&other.translation, t),
            self.scale.lerp(&other.scale, t),
            self.rotation.lerp(&other.rotation, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.translation.approx_eq(&other.translation, epsilon)
            && self.scale.approx_eq(&other.scale, epsilon)
            && self.rotation.approx_eq(&other.rotation, epsilon)
    }
}

// ============================================================================
// Motion Paths
// ============================================================================

/// Side of the straight line a curved path bulges towards
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveDirection {
    #[default]
    Up,
    Down,
}

/// Path followed by an element's translation while it moves
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPath {
    #[default]
    Linear,
    /// Quadratic arc whose control point sits `magnitude × distance` off the
    /// midpoint of the straight line
    Curved {
        direction: CurveDirection,
        magnitude: f32,
    },
}

impl MotionPath {
    pub fn curved(direction: CurveDirection, magnitude: f32) -> Self {
        MotionPath::Curved {
            direction,
            magnitude,
        }
    }

    /// Position along the path at progress `t`
    pub fn sample(&self, start: Point, end: Point, t: f32) -> Point {
        match *self {
            MotionPath::Linear => start.lerp(&end, t),
            MotionPath::Curved {
                direction,
                magnitude,
            } => {
                let delta = end - start;
                let dist = delta.length();
                if dist == 0.0 {
                    return start;
                }
                let mut normal = Point::new(-delta.y / dist, delta.x / dist);
                let flip = match direction {
                    CurveDirection::Up => normal.y < 0.0,
                    CurveDirection::Down => normal.y > 0.0,
                };
                if flip {
                    normal = -normal;
                }
                let control = start.lerp(&end, 0.5) + normal * (dist * magnitude);
                let u = 1.0 - t;
                start * (u * u) + control * (2.0 * u * t) + end * (t * t)
            }
        }
    }

    /// Interpolate a full transform, routing the translation along the path
    pub fn interpolate(&self, from: &Transform, to: &Transform, t: f32) -> Transform {
        let mut out = from.lerp(to, t);
        out.translation = self.sample(from.translation, to.translation, t);
        out
    }
}
