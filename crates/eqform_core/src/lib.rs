//! eqform Core
//!
//! Foundational types shared by the layout engine and the transition engine:
//!
//! - **Geometry**: points, baseline-relative bounds, transforms and colors
//! - **Elements**: the [`SceneElement`] capability surface and a default [`Element`]
//! - **Scene**: an arena of elements keyed by stable [`ElementId`] handles
//!
//! # Example
//!
//! ```rust
//! use eqform_core::{Element, Scene, SceneCollection};
//!
//! let mut scene = Scene::new();
//! let a = scene.insert(Element::text("a", "a"));
//! scene.show(&[a]);
//! assert_eq!(scene.shown_elements(), vec![a]);
//! ```

pub mod element;
pub mod error;
pub mod geometry;
pub mod scene;

pub use element::{Element, ElementContent, ElementId, FontSpec, FontStyle, SceneElement};
pub use error::{CoreError, Result};
pub use geometry::{Bounds, Color, Point, Transform};
pub use scene::{Scene, SceneCollection, TransformMap};
