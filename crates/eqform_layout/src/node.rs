//! Layout node tree
//!
//! An equation's content is a closed tree of [`LayoutNode`]s. Leaves refer
//! to scene elements by handle; composites own their children. A layout pass
//! is `measure` (sizes and provisional locations, bottom-up) followed by
//! `offset` (shift the finished tree onto its anchor).
//!
//! Every location is the left end of the node's baseline.

use eqform_core::{Bounds, ElementContent, ElementId, Point, Scene, Transform, TransformMap};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::align::{XAlign, YAlign};
use crate::metrics::GlyphMetrics;

/// Read-only inputs of a measure pass
pub struct LayoutContext<'a> {
    pub scene: &'a Scene,
    pub metrics: &'a dyn GlyphMetrics,
}

impl<'a> LayoutContext<'a> {
    pub fn new(scene: &'a Scene, metrics: &'a dyn GlyphMetrics) -> Self {
        Self { scene, metrics }
    }

    /// Box of an element drawn at `scale`; unknown elements are empty
    pub fn element_bounds(&self, id: ElementId, scale: f32) -> Bounds {
        match self.scene.get(id).map(|e| e.content()) {
            Some(ElementContent::Text { text, font }) => {
                self.metrics.measure(text, font, scale).to_bounds()
            }
            Some(ElementContent::Shape { extent }) => extent.scaled(scale),
            None => Bounds::ZERO,
        }
    }
}

// ============================================================================
// Node types
// ============================================================================

/// A scene element positioned by a composite node (divider, bracket, line)
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub id: ElementId,
    pub transform: Transform,
}

impl Glyph {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            transform: Transform::IDENTITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractionOptions {
    /// Gap between numerator and divider, times scale
    pub numerator_space: f32,
    /// Gap between divider and denominator, times scale
    pub denominator_space: f32,
    /// Height of the divider centre above the baseline, times scale
    pub offset_y: f32,
    /// Fraction width as a multiple of the wider of numerator and denominator
    pub width_ratio: f32,
}

impl Default for FractionOptions {
    fn default() -> Self {
        Self {
            numerator_space: 0.05,
            denominator_space: 0.05,
            offset_y: 0.07,
            width_ratio: 1.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FractionNode {
    pub numerator: LayoutNode,
    pub denominator: LayoutNode,
    pub vinculum: Option<Glyph>,
    pub options: FractionOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperSubOptions {
    /// Script scale relative to the content
    pub script_scale: f32,
    pub superscript_offset: Point,
    pub subscript_offset: Point,
    pub in_size: bool,
}

impl Default for SuperSubOptions {
    fn default() -> Self {
        Self {
            script_scale: 0.5,
            superscript_offset: Point::ZERO,
            subscript_offset: Point::ZERO,
            in_size: true,
        }
    }
}

impl SuperSubOptions {
    fn superscript_placement(&self) -> Placement {
        Placement {
            x_position: XAlign::Right,
            y_position: YAlign::AscentFraction(0.7),
            x_align: XAlign::Left,
            y_align: YAlign::Baseline,
            offset: self.superscript_offset + Point::new(self.script_scale * 0.04, 0.0),
            scale: self.script_scale,
        }
    }

    fn subscript_placement(&self) -> Placement {
        Placement {
            x_position: XAlign::Right,
            y_position: YAlign::Baseline,
            x_align: XAlign::Left,
            y_align: YAlign::AscentFraction(0.7),
            offset: self.subscript_offset,
            scale: self.script_scale,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuperSubNode {
    pub content: LayoutNode,
    pub superscript: Option<LayoutNode>,
    pub subscript: Option<LayoutNode>,
    pub options: SuperSubOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketOptions {
    pub inside_space: f32,
    pub outside_space: f32,
    pub top_space: f32,
    pub bottom_space: f32,
}

impl Default for BracketOptions {
    fn default() -> Self {
        Self {
            inside_space: 0.03,
            outside_space: 0.03,
            top_space: 0.05,
            bottom_space: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BracketNode {
    pub content: LayoutNode,
    pub left: Option<Glyph>,
    pub right: Option<Glyph>,
    pub options: BracketOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeOptions {
    /// Line thickness, times scale
    pub line_width: f32,
    /// Grow the node's box to contain the line
    pub in_size: bool,
    /// Extra horizontal space on each side of the content, times scale
    pub space: f32,
}

impl Default for StrikeOptions {
    fn default() -> Self {
        Self {
            line_width: 0.02,
            in_size: false,
            space: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StrikeNode {
    pub content: LayoutNode,
    pub line: Option<Glyph>,
    pub options: StrikeOptions,
}

/// Where an annotation sits relative to the annotated content
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    /// Point on the content box
    pub x_position: XAlign,
    pub y_position: YAlign,
    /// Point on the annotation box placed onto the content point
    pub x_align: XAlign,
    pub y_align: YAlign,
    /// Extra offset, times scale
    pub offset: Point,
    /// Annotation scale relative to the content
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x_position: XAlign::Center,
            y_position: YAlign::Top,
            x_align: XAlign::Center,
            y_align: YAlign::Bottom,
            offset: Point::ZERO,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub node: LayoutNode,
    pub placement: Placement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationNode {
    pub content: LayoutNode,
    pub annotations: Vec<Annotation>,
    pub in_size: bool,
}

/// Variant-specific part of a layout node
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Leaf(ElementId),
    /// Empty space, times scale
    Blank { width: f32, ascent: f32, descent: f32 },
    Sequence(Vec<LayoutNode>),
    Fraction(Box<FractionNode>),
    SuperSub(Box<SuperSubNode>),
    Bracket(Box<BracketNode>),
    Strike(Box<StrikeNode>),
    Annotation(Box<AnnotationNode>),
}

/// A node of the layout tree
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    pub kind: NodeKind,
    pub bounds: Bounds,
    pub location: Point,
    /// Scale resolved by the last measure pass
    pub scale: f32,
    pub scale_modifier: f32,
}

impl LayoutNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            bounds: Bounds::ZERO,
            location: Point::ZERO,
            scale: 1.0,
            scale_modifier: 1.0,
        }
    }

    pub fn leaf(id: ElementId) -> Self {
        Self::new(NodeKind::Leaf(id))
    }

    pub fn blank(width: f32) -> Self {
        Self::new(NodeKind::Blank {
            width,
            ascent: 0.0,
            descent: 0.0,
        })
    }

    pub fn sequence(children: Vec<LayoutNode>) -> Self {
        Self::new(NodeKind::Sequence(children))
    }

    pub fn fraction(numerator: LayoutNode, denominator: LayoutNode, vinculum: Option<ElementId>) -> Self {
        Self::new(NodeKind::Fraction(Box::new(FractionNode {
            numerator,
            denominator,
            vinculum: vinculum.map(Glyph::new),
            options: FractionOptions::default(),
        })))
    }

    pub fn with_scale_modifier(mut self, modifier: f32) -> Self {
        self.scale_modifier = modifier;
        self
    }

    // ========================================================================
    // Measure pass
    // ========================================================================

    /// Compute this node's box and lay its subtree out from `location`
    pub fn measure(&mut self, ctx: &LayoutContext<'_>, location: Point, incoming_scale: f32) {
        let scale = incoming_scale * self.scale_modifier;
        self.scale = scale;
        self.location = location;
        self.bounds = match &mut self.kind {
            NodeKind::Leaf(id) => ctx.element_bounds(*id, scale),
            NodeKind::Blank {
                width,
                ascent,
                descent,
            } => Bounds::new(*width * scale, *ascent * scale, *descent * scale),
            NodeKind::Sequence(children) => measure_sequence(children, ctx, location, scale),
            NodeKind::Fraction(f) => f.measure(ctx, location, scale),
            NodeKind::SuperSub(s) => s.measure(ctx, location, scale),
            NodeKind::Bracket(b) => b.measure(ctx, location, scale),
            NodeKind::Strike(s) => s.measure(ctx, location, scale),
            NodeKind::Annotation(a) => a.measure(ctx, location, scale),
        };
    }

    /// Shift this node and its subtree by `delta`
    pub fn offset(&mut self, delta: Point) {
        self.location = self.location + delta;
        match &mut self.kind {
            NodeKind::Leaf(_) | NodeKind::Blank { .. } => {}
            NodeKind::Sequence(children) => {
                for child in children {
                    child.offset(delta);
                }
            }
            NodeKind::Fraction(f) => {
                f.numerator.offset(delta);
                f.denominator.offset(delta);
                offset_glyph(&mut f.vinculum, delta);
            }
            NodeKind::SuperSub(s) => {
                s.content.offset(delta);
                for script in s.superscript.iter_mut().chain(s.subscript.iter_mut()) {
                    script.offset(delta);
                }
            }
            NodeKind::Bracket(b) => {
                b.content.offset(delta);
                offset_glyph(&mut b.left, delta);
                offset_glyph(&mut b.right, delta);
            }
            NodeKind::Strike(s) => {
                s.content.offset(delta);
                offset_glyph(&mut s.line, delta);
            }
            NodeKind::Annotation(a) => {
                a.content.offset(delta);
                for annotation in &mut a.annotations {
                    annotation.node.offset(delta);
                }
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every element the tree positions, in tree order
    pub fn elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.visit_transforms(&mut |id, _| out.push(id));
        out
    }

    /// Resolved transform of every element in the tree
    pub fn transforms(&self) -> TransformMap {
        let mut out = TransformMap::new();
        self.visit_transforms(&mut |id, t| {
            out.insert(id, t);
        });
        out
    }

    /// Location and box of the leaf drawing `id`, if the tree has one
    pub fn find_leaf(&self, id: ElementId) -> Option<(Point, Bounds)> {
        match &self.kind {
            NodeKind::Leaf(leaf) if *leaf == id => Some((self.location, self.bounds)),
            _ => self
                .children()
                .into_iter()
                .find_map(|child| child.find_leaf(id)),
        }
    }

    fn children(&self) -> SmallVec<[&LayoutNode; 4]> {
        let mut out = SmallVec::new();
        match &self.kind {
            NodeKind::Leaf(_) | NodeKind::Blank { .. } => {}
            NodeKind::Sequence(children) => out.extend(children.iter()),
            NodeKind::Fraction(f) => {
                out.push(&f.numerator);
                out.push(&f.denominator);
            }
            NodeKind::SuperSub(s) => {
                out.push(&s.content);
                out.extend(s.superscript.iter());
                out.extend(s.subscript.iter());
            }
            NodeKind::Bracket(b) => out.push(&b.content),
            NodeKind::Strike(s) => out.push(&s.content),
            NodeKind::Annotation(a) => {
                out.push(&a.content);
                out.extend(a.annotations.iter().map(|an| &an.node));
            }
        }
        out
    }

    fn glyphs(&self) -> SmallVec<[&Glyph; 2]> {
        let mut out = SmallVec::new();
        match &self.kind {
            NodeKind::Fraction(f) => out.extend(f.vinculum.iter()),
            NodeKind::Bracket(b) => {
                out.extend(b.left.iter());
                out.extend(b.right.iter());
            }
            NodeKind::Strike(s) => out.extend(s.line.iter()),
            _ => {}
        }
        out
    }

    fn visit_transforms(&self, f: &mut dyn FnMut(ElementId, Transform)) {
        if let NodeKind::Leaf(id) = self.kind {
            f(id, Transform::from_translation(self.location).with_scale(self.scale));
            return;
        }
        for child in self.children() {
            child.visit_transforms(f);
        }
        for glyph in self.glyphs() {
            f(glyph.id, glyph.transform);
        }
    }
}

fn offset_glyph(glyph: &mut Option<Glyph>, delta: Point) {
    if let Some(g) = glyph {
        g.transform.translation = g.transform.translation + delta;
    }
}

// ============================================================================
// Variant layouts
// ============================================================================

fn measure_sequence(
    children: &mut [LayoutNode],
    ctx: &LayoutContext<'_>,
    location: Point,
    scale: f32,
) -> Bounds {
    let mut x = location.x;
    let mut ascent: f32 = 0.0;
    let mut descent: f32 = 0.0;
    for child in children.iter_mut() {
        child.measure(ctx, Point::new(x, location.y), scale);
        x += child.bounds.width;
        ascent = ascent.max(child.bounds.ascent);
        descent = descent.max(child.bounds.descent);
    }
    Bounds::new(x - location.x, ascent, descent)
}

impl FractionNode {
    fn measure(&mut self, ctx: &LayoutContext<'_>, location: Point, scale: f32) -> Bounds {
        let o = self.options;
        self.numerator.measure(ctx, location, scale);
        self.denominator.measure(ctx, location, scale);
        let num = self.numerator.bounds;
        let den = self.denominator.bounds;

        let width = o.width_ratio * num.width.max(den.width);
        let thickness = (0.01 * scale).max(0.008);
        let bar_y = location.y + o.offset_y * scale;

        let num_loc = Point::new(
            location.x + (width - num.width) / 2.0,
            bar_y + thickness / 2.0 + o.numerator_space * scale + num.descent,
        );
        let den_loc = Point::new(
            location.x + (width - den.width) / 2.0,
            bar_y - thickness / 2.0 - o.denominator_space * scale - den.ascent,
        );
        self.numerator.offset(num_loc - location);
        self.denominator.offset(den_loc - location);

        if let Some(bar) = &mut self.vinculum {
            bar.transform = Transform::from_translation(Point::new(location.x, bar_y))
                .with_scale_xy(width, thickness);
        }

        let ascent = num_loc.y + num.ascent - location.y;
        let descent = location.y - (den_loc.y - den.descent);
        Bounds::new(width, ascent, descent)
    }
}

/// Lay an annotation node out against the content box at `content_loc`
fn place(
    node: &mut LayoutNode,
    placement: &Placement,
    ctx: &LayoutContext<'_>,
    content_loc: Point,
    content: &Bounds,
    scale: f32,
) {
    node.measure(ctx, content_loc, scale * placement.scale);
    let anchor = content_loc
        + Point::new(
            placement.x_position.resolve(content),
            placement.y_position.resolve(content),
        );
    let align = Point::new(
        placement.x_align.resolve(&node.bounds),
        placement.y_align.resolve(&node.bounds),
    );
    let target = anchor - align + placement.offset * scale;
    node.offset(target - node.location);
}

/// Union of boxes around a common baseline. Returns the union and how far
/// it extends left of `location`.
fn union_bounds<'a, I>(location: Point, content: &Bounds, others: I) -> (Bounds, f32)
where
    I: IntoIterator<Item = &'a LayoutNode>,
{
    let mut min_x = location.x;
    let mut max_x = location.x + content.width;
    let mut top = location.y + content.ascent;
    let mut bottom = location.y - content.descent;
    for node in others {
        min_x = min_x.min(node.location.x);
        max_x = max_x.max(node.location.x + node.bounds.width);
        top = top.max(node.location.y + node.bounds.ascent);
        bottom = bottom.min(node.location.y - node.bounds.descent);
    }
    (
        Bounds::new(max_x - min_x, top - location.y, location.y - bottom),
        location.x - min_x,
    )
}

impl SuperSubNode {
    fn measure(&mut self, ctx: &LayoutContext<'_>, location: Point, scale: f32) -> Bounds {
        self.content.measure(ctx, location, scale);
        let content = self.content.bounds;
        if let Some(sup) = &mut self.superscript {
            place(sup, &self.options.superscript_placement(), ctx, location, &content, scale);
        }
        if let Some(sub) = &mut self.subscript {
            place(sub, &self.options.subscript_placement(), ctx, location, &content, scale);
        }
        if !self.options.in_size {
            return content;
        }
        let scripts = self.superscript.iter().chain(self.subscript.iter());
        let (bounds, left_overhang) = union_bounds(location, &content, scripts);
        if left_overhang > 0.0 {
            let shift = Point::new(left_overhang, 0.0);
            self.content.offset(shift);
            for script in self.superscript.iter_mut().chain(self.subscript.iter_mut()) {
                script.offset(shift);
            }
        }
        bounds
    }
}

impl AnnotationNode {
    fn measure(&mut self, ctx: &LayoutContext<'_>, location: Point, scale: f32) -> Bounds {
        self.content.measure(ctx, location, scale);
        let content = self.content.bounds;
        for annotation in &mut self.annotations {
            place(&mut annotation.node, &annotation.placement, ctx, location, &content, scale);
        }
        if !self.in_size {
            return content;
        }
        let (bounds, left_overhang) =
            union_bounds(location, &content, self.annotations.iter().map(|a| &a.node));
        if left_overhang > 0.0 {
            let shift = Point::new(left_overhang, 0.0);
            self.content.offset(shift);
            for annotation in &mut self.annotations {
                annotation.node.offset(shift);
            }
        }
        bounds
    }
}

impl BracketNode {
    fn measure(&mut self, ctx: &LayoutContext<'_>, location: Point, scale: f32) -> Bounds {
        let o = self.options;
        self.content.measure(ctx, location, scale);
        let content = self.content.bounds;

        let glyph_descent = content.descent + o.bottom_space * scale;
        let glyph_height = glyph_descent + content.ascent + o.top_space * scale;
        let base_y = location.y - glyph_descent;

        let mut x = location.x + o.outside_space * scale;
        x += stretch_glyph(&mut self.left, ctx, Point::new(x, base_y), glyph_height);
        x += o.inside_space * scale;

        self.content.offset(Point::new(x - location.x, 0.0));
        x += content.width + o.inside_space * scale;

        x += stretch_glyph(&mut self.right, ctx, Point::new(x, base_y), glyph_height);
        x += o.outside_space * scale;

        Bounds::new(
            x - location.x,
            (glyph_height - glyph_descent).max(content.ascent),
            glyph_descent.max(content.descent),
        )
    }
}

/// Size a bracket glyph to `height` with its bottom-left at `origin`.
/// Returns the glyph width.
fn stretch_glyph(
    glyph: &mut Option<Glyph>,
    ctx: &LayoutContext<'_>,
    origin: Point,
    height: f32,
) -> f32 {
    let Some(g) = glyph else {
        return 0.0;
    };
    let unit = ctx.element_bounds(g.id, 1.0);
    let k = if unit.height > 0.0 { height / unit.height } else { height };
    g.transform = Transform::from_translation(Point::new(origin.x, origin.y + unit.descent * k))
        .with_scale(k);
    unit.width * k
}

impl StrikeNode {
    fn measure(&mut self, ctx: &LayoutContext<'_>, location: Point, scale: f32) -> Bounds {
        let o = self.options;
        let space = o.space * scale;
        self.content.measure(ctx, Point::new(location.x + space, location.y), scale);
        let content = self.content.bounds;

        let line_width = o.line_width * scale;
        let bottom_left = Point::new(location.x + space, location.y - content.descent);
        let top_right = Point::new(
            location.x + space + content.width,
            location.y + content.ascent * 0.8,
        );
        let direction = top_right - bottom_left;
        let angle = direction.angle();
        let length = direction.length() + 2.0 * line_width;
        let start = bottom_left - Point::new(angle.cos(), angle.sin()) * line_width;
        let end = start + Point::new(angle.cos(), angle.sin()) * length;

        if let Some(line) = &mut self.line {
            line.transform = Transform::from_translation(start)
                .with_scale_xy(length, line_width)
                .with_rotation(angle);
        }

        let width = content.width + 2.0 * space;
        if !o.in_size {
            return Bounds::new(width, content.ascent, content.descent);
        }
        Bounds::new(
            width.max(end.x - location.x),
            content.ascent.max(end.y.max(start.y) - location.y),
            content.descent.max(location.y - start.y.min(end.y)),
        )
    }
}
