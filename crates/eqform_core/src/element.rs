//! Scene elements
//!
//! An equation is drawn from a flat set of scene elements (glyphs and simple
//! shapes such as fraction bars or bracket glyphs). Layout and animation only
//! see elements through the [`SceneElement`] capability surface, so a
//! renderer can supply its own element type.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::geometry::{Bounds, Color, Transform};

new_key_type! {
    /// Stable handle to an element in a [`Scene`](crate::Scene)
    pub struct ElementId;
}

/// Font style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Font used by a text element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    /// Font size in equation units at scale 1
    pub size: f32,
    pub style: FontStyle,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Times New Roman".to_string(),
            size: 0.2,
            style: FontStyle::Italic,
        }
    }
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            ..Default::default()
        }
    }

    /// Upright variant, for operators and digits
    pub fn normal(mut self) -> Self {
        self.style = FontStyle::Normal;
        self
    }
}

/// What an element draws
#[derive(Clone, Debug, PartialEq)]
pub enum ElementContent {
    /// A run of text measured by the glyph metrics provider
    Text { text: String, font: FontSpec },
    /// A shape with a fixed box at unit scale (bars, bracket glyphs, lines)
    Shape { extent: Bounds },
}

/// Capability surface the layout engine and animations use
pub trait SceneElement: std::fmt::Debug {
    fn name(&self) -> &str;
    fn content(&self) -> &ElementContent;

    fn transform(&self) -> Transform;
    fn set_transform(&mut self, transform: Transform);

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);

    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
}

/// Default element implementation
#[derive(Clone, Debug)]
pub struct Element {
    name: String,
    content: ElementContent,
    transform: Transform,
    visible: bool,
    opacity: f32,
    color: Color,
}

impl Element {
    fn with_content(name: impl Into<String>, content: ElementContent) -> Self {
        Self {
            name: name.into(),
            content,
            transform: Transform::IDENTITY,
            visible: false,
            opacity: 1.0,
            color: Color::BLACK,
        }
    }

    /// Text element drawn with the default font
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_content(
            name,
            ElementContent::Text {
                text: text.into(),
                font: FontSpec::default(),
            },
        )
    }

    /// Shape element with the given unit-scale box
    pub fn shape(name: impl Into<String>, extent: Bounds) -> Self {
        Self::with_content(name, ElementContent::Shape { extent })
    }

    /// Horizontal bar of unit length and unit thickness centred on its
    /// baseline, stretched by its transform's scale (fraction vinculum)
    pub fn bar(name: impl Into<String>) -> Self {
        Self::shape(name, Bounds::new(1.0, 0.5, 0.5))
    }

    /// Line of unit length starting at the origin, rotated and stretched by
    /// its transform (strike-through)
    pub fn line(name: impl Into<String>) -> Self {
        Self::shape(name, Bounds::new(1.0, 0.0, 0.0))
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        if let ElementContent::Text { font: f, .. } = &mut self.content {
            *f = font;
        }
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl SceneElement for Element {
    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &ElementContent {
        &self.content
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
