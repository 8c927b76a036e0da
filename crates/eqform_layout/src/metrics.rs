//! Glyph measurement for layout
//!
//! Provides a trait for measuring text runs during layout. Layout only needs
//! the width and the extents above and below the baseline; everything else
//! about fonts stays with the renderer.

use eqform_core::{Bounds, FontSpec};

/// Measured extent of a text run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphExtent {
    /// Advance width in equation units
    pub width: f32,
    /// Distance from baseline to top
    pub ascent: f32,
    /// Distance from baseline to bottom (positive below the baseline)
    pub descent: f32,
}

impl GlyphExtent {
    pub fn new(width: f32, ascent: f32, descent: f32) -> Self {
        Self {
            width,
            ascent,
            descent,
        }
    }

    pub fn to_bounds(&self) -> Bounds {
        Bounds::new(self.width, self.ascent, self.descent)
    }
}

/// Trait for measuring text dimensions
///
/// Implement this to back layout with real font metrics. `measure` must be
/// a pure function of its arguments.
pub trait GlyphMetrics {
    /// Measure `text` drawn with `font` at `scale`
    fn measure(&self, text: &str, font: &FontSpec, scale: f32) -> GlyphExtent;
}

/// A glyph metrics provider that uses estimates
///
/// Used when no font backend is available. Widths are proportional to the
/// character count and the font size.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedGlyphMetrics {
    /// Advance per character as a fraction of the font size
    pub char_width: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl Default for EstimatedGlyphMetrics {
    fn default() -> Self {
        Self {
            char_width: 0.55,
            ascent: 0.7,
            descent: 0.2,
        }
    }
}

impl GlyphMetrics for EstimatedGlyphMetrics {
    fn measure(&self, text: &str, font: &FontSpec, scale: f32) -> GlyphExtent {
        let size = font.size * scale;
        let char_count = text.chars().count() as f32;
        GlyphExtent {
            width: char_count * size * self.char_width,
            ascent: size * self.ascent,
            descent: size * self.descent,
        }
    }
}

/// Deterministic provider with a fixed advance per character, independent
/// of the font
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMetrics {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl FixedAdvanceMetrics {
    pub fn new(advance: f32) -> Self {
        Self {
            advance,
            ..Default::default()
        }
    }

    pub fn with_extents(mut self, ascent: f32, descent: f32) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }
}

impl Default for FixedAdvanceMetrics {
    fn default() -> Self {
        Self {
            advance: 0.04,
            ascent: 0.07,
            descent: 0.02,
        }
    }
}

impl GlyphMetrics for FixedAdvanceMetrics {
    fn measure(&self, text: &str, _font: &FontSpec, scale: f32) -> GlyphExtent {
        let char_count = text.chars().count() as f32;
        GlyphExtent {
            width: char_count * self.advance * scale,
            ascent: self.ascent * scale,
            descent: self.descent * scale,
        }
    }
}
