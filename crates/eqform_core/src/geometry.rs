//! Geometry primitives
//!
//! Points, baseline-relative boxes, element transforms and colors. All
//! coordinates are in equation space: y grows upward and a box is described
//! by its width plus the ascent and descent around a baseline.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{CoreError, Result};

// ============================================================================
// Point
// ============================================================================

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same value on both axes
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Angle of the vector from the origin, in radians
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

// ============================================================================
// Bounds
// ============================================================================

/// Baseline-relative box: `height == ascent + descent`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds {
        width: 0.0,
        height: 0.0,
        ascent: 0.0,
        descent: 0.0,
    };

    /// Build a box from its width and vertical extents. A negative descent
    /// is clamped to zero.
    pub fn new(width: f32, ascent: f32, descent: f32) -> Self {
        let descent = descent.max(0.0);
        Self {
            width,
            height: ascent + descent,
            ascent,
            descent,
        }
    }

    /// Uniformly scale every extent
    pub fn scaled(&self, scale: f32) -> Self {
        Self::new(self.width * scale, self.ascent * scale, self.descent * scale)
    }

    /// Scale width and height independently (used for stretched glyphs)
    pub fn scaled_xy(&self, scale: Point) -> Self {
        Self::new(
            self.width * scale.x,
            self.ascent * scale.y,
            self.descent * scale.y,
        )
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Element transform applied as scale, then rotation, then translation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Point,
    pub scale: Point,
    /// Rotation in radians, counter-clockwise
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Point::ZERO,
        scale: Point::splat(1.0),
        rotation: 0.0,
    };

    pub const fn new(translation: Point, scale: Point, rotation: f32) -> Self {
        Self {
            translation,
            scale,
            rotation,
        }
    }

    /// Pure translation
    pub const fn from_translation(translation: Point) -> Self {
        Self {
            translation,
            scale: Point::splat(1.0),
            rotation: 0.0,
        }
    }

    pub fn with_translation(mut self, translation: Point) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Point::splat(scale);
        self
    }

    pub fn with_scale_xy(mut self, x: f32, y: f32) -> Self {
        self.scale = Point::new(x, y);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Map a point from element-local space
    pub fn apply(&self, p: Point) -> Point {
        let sx = p.x * self.scale.x;
        let sy = p.y * self.scale.y;
        let (sin, cos) = self.rotation.sin_cos();
        Point::new(
            sx * cos - sy * sin + self.translation.x,
            sx * sin + sy * cos + self.translation.y,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.scale.is_finite() && self.rotation.is_finite()
    }

    /// Reject transforms carrying NaN or infinite components
    pub fn validate(&self) -> Result<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(CoreError::NonFiniteTransform(format!("{:?}", self)))
        }
    }
}

// ============================================================================
// Color
// ============================================================================

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
