//! eqform Layout Engine
//!
//! Baseline box layout for equation trees. A tree of [`LayoutNode`]s is
//! sized bottom-up at a scale, offset so an alignment point lands on an
//! anchor, and the resolved transforms are pushed to the scene elements.
//!
//! # Example
//!
//! ```rust
//! use eqform_core::{Element, Scene};
//! use eqform_layout::{arrange, ArrangeParams, FixedAdvanceMetrics, Phrase};
//!
//! let mut scene = Scene::new();
//! scene.insert(Element::text("a", "a"));
//! scene.insert(Element::text("b", "b"));
//!
//! let mut node = Phrase::seq(["a", "b"]).build(&scene);
//! let out = arrange(&mut node, &mut scene, &FixedAdvanceMetrics::new(0.04), &ArrangeParams::new(1.0)).unwrap();
//! assert!((out.bounds.width - 0.08).abs() < 1e-6);
//! ```

pub mod align;
pub mod arrange;
pub mod error;
pub mod metrics;
pub mod node;
pub mod phrase;

pub use align::{align_offset, Anchor, XAlign, YAlign};
pub use arrange::{arrange, layout, Alignment, ArrangeParams, Arranged};
pub use error::{LayoutError, Result};
pub use metrics::{EstimatedGlyphMetrics, FixedAdvanceMetrics, GlyphExtent, GlyphMetrics};
pub use node::{
    Annotation, AnnotationNode, BracketNode, BracketOptions, FractionNode, FractionOptions, Glyph,
    LayoutContext, LayoutNode, NodeKind, Placement, StrikeNode, StrikeOptions, SuperSubNode,
    SuperSubOptions,
};
pub use phrase::Phrase;
