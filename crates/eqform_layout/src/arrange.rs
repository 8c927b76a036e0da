//! Layout engine entry point
//!
//! `arrange` sizes a tree at a scale, moves it so the chosen alignment point
//! lands on the anchor, and pushes the resulting transforms to the scene.

use eqform_core::{Bounds, Point, Scene, SceneCollection, SceneElement, TransformMap};
use serde::{Deserialize, Serialize};

use crate::align::{align_offset, Anchor, XAlign, YAlign};
use crate::error::{LayoutError, Result};
use crate::metrics::GlyphMetrics;
use crate::node::{LayoutContext, LayoutNode};

/// Scale and alignment of one layout pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrangeParams {
    pub scale: f32,
    pub x_align: XAlign,
    pub y_align: YAlign,
    pub anchor: Anchor,
}

impl Default for ArrangeParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            x_align: XAlign::Left,
            y_align: YAlign::Baseline,
            anchor: Anchor::default(),
        }
    }
}

impl ArrangeParams {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    pub fn with_alignment(mut self, x: XAlign, y: YAlign) -> Self {
        self.x_align = x;
        self.y_align = y;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Serializable alignment pair used in configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alignment {
    pub x: XAlign,
    pub y: YAlign,
}

/// Result of a layout pass
#[derive(Clone, Debug, PartialEq)]
pub struct Arranged {
    /// Box of the whole tree after the anchor offset
    pub bounds: Bounds,
    pub location: Point,
    /// Where the aligned point ended up
    pub anchor_point: Point,
    /// Resolved transform of every element in the tree
    pub transforms: TransformMap,
}

/// Lay `node` out and push every resolved transform to `scene`.
///
/// Fails only for a non-positive or non-finite scale, or if the layout
/// produced a non-finite transform; the scene is untouched on failure.
pub fn arrange(
    node: &mut LayoutNode,
    scene: &mut Scene,
    metrics: &dyn GlyphMetrics,
    params: &ArrangeParams,
) -> Result<Arranged> {
    let arranged = layout(node, scene, metrics, params)?;
    scene.set_element_transforms(&arranged.transforms);
    Ok(arranged)
}

/// Lay `node` out without touching the scene
pub fn layout(
    node: &mut LayoutNode,
    scene: &Scene,
    metrics: &dyn GlyphMetrics,
    params: &ArrangeParams,
) -> Result<Arranged> {
    if !(params.scale.is_finite() && params.scale > 0.0) {
        return Err(LayoutError::InvalidScale(params.scale));
    }

    let ctx = LayoutContext::new(scene, metrics);
    node.measure(&ctx, Point::ZERO, params.scale);

    let (box_location, box_bounds, target) = match params.anchor {
        Anchor::Point(p) => (node.location, node.bounds, p),
        Anchor::Element(id) => {
            let (location, bounds) = match node.find_leaf(id) {
                Some(found) => found,
                None => match scene.get(id) {
                    Some(e) => {
                        let t = e.transform();
                        let unit = ctx.element_bounds(id, 1.0);
                        (t.translation, unit.scaled_xy(t.scale))
                    }
                    None => {
                        tracing::warn!("layout anchor {:?} is not a known element, using origin", id);
                        (node.location, node.bounds)
                    }
                },
            };
            (location, bounds, Point::ZERO)
        }
    };

    let aligned = box_location + align_offset(&box_bounds, params.x_align, params.y_align);
    node.offset(target - aligned);

    let transforms = node.transforms();
    for t in transforms.values() {
        t.validate()?;
    }
    tracing::trace!(
        "arranged {} elements, box {:?} at {:?}",
        transforms.len(),
        node.bounds,
        node.location
    );

    Ok(Arranged {
        bounds: node.bounds,
        location: node.location,
        anchor_point: target,
        transforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FixedAdvanceMetrics;
    use eqform_core::Element;

    fn abc() -> (Scene, LayoutNode, [eqform_core::ElementId; 3]) {
        let mut scene = Scene::new();
        let a = scene.insert(Element::text("a", "a"));
        let b = scene.insert(Element::text("b", "b"));
        let c = scene.insert(Element::text("c", "c"));
        let node = LayoutNode::sequence(vec![
            LayoutNode::leaf(a),
            LayoutNode::leaf(b),
            LayoutNode::leaf(c),
        ]);
        (scene, node, [a, b, c])
    }

    #[test]
    fn test_left_baseline_positions() {
        let (mut scene, mut node, [a, b, c]) = abc();
        let metrics = FixedAdvanceMetrics::new(0.04);
        arrange(&mut node, &mut scene, &metrics, &ArrangeParams::new(1.0)).unwrap();

        let x = |id| scene.get(id).unwrap().transform().translation.x;
        assert_eq!(x(a), 0.0);
        assert!((x(b) - 0.04).abs() < 1e-6);
        assert!((x(c) - 0.08).abs() < 1e-6);
        assert_eq!(scene.get(a).unwrap().transform().translation.y, 0.0);
    }

    #[test]
    fn test_anchor_point_round_trip() {
        let metrics = FixedAdvanceMetrics::new(0.04);
        let p = Point::new(0.5, -0.25);
        let xs = [
            XAlign::Left,
            XAlign::Center,
            XAlign::Right,
            XAlign::Fraction(0.3),
            XAlign::Offset(0.01),
        ];
        let ys = [
            YAlign::Baseline,
            YAlign::Top,
            YAlign::Bottom,
            YAlign::Middle,
            YAlign::Fraction(0.25),
            YAlign::AscentFraction(0.7),
            YAlign::Offset(0.02),
        ];
        for x in xs {
            for y in ys {
                let (scene, mut node, _) = abc();
                let params = ArrangeParams::new(2.0)
                    .with_alignment(x, y)
                    .with_anchor(Anchor::Point(p));
                let out = layout(&mut node, &scene, &metrics, &params).unwrap();
                let resolved = out.location + align_offset(&out.bounds, x, y);
                assert!((resolved.x - p.x).abs() < 1e-6, "{:?} {:?}", x, y);
                assert!((resolved.y - p.y).abs() < 1e-6, "{:?} {:?}", x, y);
                assert_eq!(out.anchor_point, p);
            }
        }
    }

    #[test]
    fn test_element_anchor_uses_element_box() {
        let (scene, mut node, [_, b, _]) = abc();
        let metrics = FixedAdvanceMetrics::new(0.04);
        let params = ArrangeParams::new(1.0)
            .with_alignment(XAlign::Center, YAlign::Baseline)
            .with_anchor(Anchor::Element(b));
        let out = layout(&mut node, &scene, &metrics, &params).unwrap();

        // centre of b lands on the origin
        let bx = out.transforms[&b].translation.x;
        assert!((bx + 0.02).abs() < 1e-6);
        assert!((out.location.x + 0.06).abs() < 1e-6);
    }

    #[test]
    fn test_idempotent() {
        let (mut scene, mut node, _) = abc();
        let metrics = FixedAdvanceMetrics::new(0.04);
        let params = ArrangeParams::new(1.5)
            .with_alignment(XAlign::Center, YAlign::Middle)
            .with_anchor(Anchor::Point(Point::new(0.1, 0.2)));
        let first = arrange(&mut node, &mut scene, &metrics, &params).unwrap();
        let second = arrange(&mut node, &mut scene, &metrics, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fraction_height_is_linear_in_scale() {
        let mut scene = Scene::new();
        let n = scene.insert(Element::text("n", "n"));
        let d = scene.insert(Element::text("d", "d"));
        let v = scene.insert(Element::bar("v"));
        let metrics = FixedAdvanceMetrics::new(0.04);

        let mut frac = LayoutNode::fraction(LayoutNode::leaf(n), LayoutNode::leaf(d), Some(v));
        let h1 = layout(&mut frac, &scene, &metrics, &ArrangeParams::new(1.0))
            .unwrap()
            .bounds
            .height;
        let h2 = layout(&mut frac, &scene, &metrics, &ArrangeParams::new(2.0))
            .unwrap()
            .bounds
            .height;
        assert!((h2 / h1 - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let (mut scene, mut node, [a, _, _]) = abc();
        let metrics = FixedAdvanceMetrics::new(0.04);
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = arrange(&mut node, &mut scene, &metrics, &ArrangeParams::new(scale));
            assert!(matches!(err, Err(LayoutError::InvalidScale(_))));
        }
        assert_eq!(
            scene.get(a).unwrap().transform(),
            eqform_core::Transform::IDENTITY
        );
    }
}
