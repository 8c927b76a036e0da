//! Alignment and anchoring
//!
//! Alignments select a point on a baseline-relative box. x is measured from
//! the box's left edge, y from its baseline.

use eqform_core::{Bounds, ElementId, Point};
use serde::{Deserialize, Serialize};

/// Horizontal alignment point on a box
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAlign {
    #[default]
    Left,
    Center,
    Right,
    /// Fraction of the width from the left edge
    Fraction(f32),
    /// Literal distance from the left edge
    Offset(f32),
}

impl XAlign {
    pub fn resolve(&self, bounds: &Bounds) -> f32 {
        match *self {
            XAlign::Left => 0.0,
            XAlign::Center => bounds.width / 2.0,
            XAlign::Right => bounds.width,
            XAlign::Fraction(f) => bounds.width * f,
            XAlign::Offset(d) => d,
        }
    }
}

/// Vertical alignment point on a box
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAlign {
    #[default]
    Baseline,
    Bottom,
    Middle,
    Top,
    /// Fraction of the height measured up from the bottom
    Fraction(f32),
    /// Fraction of the ascent above the baseline
    AscentFraction(f32),
    /// Literal distance above the baseline
    Offset(f32),
}

impl YAlign {
    pub fn resolve(&self, bounds: &Bounds) -> f32 {
        match *self {
            YAlign::Baseline => 0.0,
            YAlign::Bottom => -bounds.descent,
            YAlign::Middle => -bounds.descent + bounds.height / 2.0,
            YAlign::Top => bounds.ascent,
            YAlign::Fraction(f) => -bounds.descent + bounds.height * f,
            YAlign::AscentFraction(f) => bounds.ascent * f,
            YAlign::Offset(d) => d,
        }
    }
}

/// Where the aligned point of a layout ends up
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// The aligned point of the whole tree lands on this point
    Point(Point),
    /// The aligned point of this element's box lands on the origin
    Element(ElementId),
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::Point(Point::ZERO)
    }
}

/// Offset of the aligned point from a box's left-baseline location
pub fn align_offset(bounds: &Bounds, x: XAlign, y: YAlign) -> Point {
    Point::new(x.resolve(bounds), y.resolve(bounds))
}
