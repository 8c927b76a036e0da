//! Declarative equation content
//!
//! A [`Phrase`] names elements instead of holding handles, so forms can be
//! written before (or without) knowing which elements exist. Building a
//! phrase against a scene resolves names; unknown names are skipped with a
//! warning.

use eqform_core::{ElementId, Point, Scene};

use crate::align::{XAlign, YAlign};
use crate::node::{
    Annotation, AnnotationNode, BracketNode, BracketOptions, FractionNode, FractionOptions, Glyph,
    LayoutNode, NodeKind, Placement, StrikeNode, StrikeOptions, SuperSubNode, SuperSubOptions,
};

/// Default width of a `space` phrase at scale 1
pub const DEFAULT_SPACE: f32 = 0.03;

#[derive(Clone, Debug, PartialEq)]
pub enum Phrase {
    /// A single named element
    Element(String),
    /// Horizontal space, times scale
    Space(f32),
    Seq(Vec<Phrase>),
    Frac {
        numerator: Box<Phrase>,
        denominator: Box<Phrase>,
        vinculum: Option<String>,
        options: FractionOptions,
    },
    SupSub {
        content: Box<Phrase>,
        superscript: Option<Box<Phrase>>,
        subscript: Option<Box<Phrase>>,
        options: SuperSubOptions,
    },
    Bracket {
        content: Box<Phrase>,
        left: Option<String>,
        right: Option<String>,
        options: BracketOptions,
    },
    Strike {
        content: Box<Phrase>,
        line: Option<String>,
        options: StrikeOptions,
    },
    Annotate {
        content: Box<Phrase>,
        annotations: Vec<(Phrase, Placement)>,
        in_size: bool,
    },
    /// Content drawn at a multiple of the incoming scale
    Scaled { content: Box<Phrase>, scale: f32 },
}

impl From<&str> for Phrase {
    fn from(name: &str) -> Self {
        Phrase::Element(name.to_string())
    }
}

impl From<String> for Phrase {
    fn from(name: String) -> Self {
        Phrase::Element(name)
    }
}

impl<T: Into<Phrase>> From<Vec<T>> for Phrase {
    fn from(items: Vec<T>) -> Self {
        Phrase::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl Phrase {
    pub fn elem(name: impl Into<String>) -> Self {
        Phrase::Element(name.into())
    }

    pub fn space() -> Self {
        Phrase::Space(DEFAULT_SPACE)
    }

    pub fn seq<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Phrase>,
    {
        Phrase::Seq(items.into_iter().map(Into::into).collect())
    }

    pub fn frac(numerator: impl Into<Phrase>, denominator: impl Into<Phrase>, vinculum: Option<&str>) -> Self {
        Phrase::Frac {
            numerator: Box::new(numerator.into()),
            denominator: Box::new(denominator.into()),
            vinculum: vinculum.map(str::to_string),
            options: FractionOptions::default(),
        }
    }

    pub fn sup(content: impl Into<Phrase>, superscript: impl Into<Phrase>) -> Self {
        Self::sup_sub(content, Some(superscript.into()), None)
    }

    pub fn sub(content: impl Into<Phrase>, subscript: impl Into<Phrase>) -> Self {
        Self::sup_sub(content, None, Some(subscript.into()))
    }

    pub fn sup_sub(content: impl Into<Phrase>, superscript: Option<Phrase>, subscript: Option<Phrase>) -> Self {
        Phrase::SupSub {
            content: Box::new(content.into()),
            superscript: superscript.map(Box::new),
            subscript: subscript.map(Box::new),
            options: SuperSubOptions::default(),
        }
    }

    pub fn brac(content: impl Into<Phrase>, left: Option<&str>, right: Option<&str>) -> Self {
        Phrase::Bracket {
            content: Box::new(content.into()),
            left: left.map(str::to_string),
            right: right.map(str::to_string),
            options: BracketOptions::default(),
        }
    }

    pub fn strike(content: impl Into<Phrase>, line: &str) -> Self {
        Phrase::Strike {
            content: Box::new(content.into()),
            line: Some(line.to_string()),
            options: StrikeOptions::default(),
        }
    }

    /// Annotation centred above the content
    pub fn top_comment(content: impl Into<Phrase>, comment: impl Into<Phrase>, scale: f32) -> Self {
        Phrase::Annotate {
            content: Box::new(content.into()),
            annotations: vec![(
                comment.into(),
                Placement {
                    x_position: XAlign::Center,
                    y_position: YAlign::Top,
                    x_align: XAlign::Center,
                    y_align: YAlign::Bottom,
                    offset: Point::new(0.0, 0.03),
                    scale,
                },
            )],
            in_size: true,
        }
    }

    /// Annotation centred below the content
    pub fn bottom_comment(content: impl Into<Phrase>, comment: impl Into<Phrase>, scale: f32) -> Self {
        Phrase::Annotate {
            content: Box::new(content.into()),
            annotations: vec![(
                comment.into(),
                Placement {
                    x_position: XAlign::Center,
                    y_position: YAlign::Bottom,
                    x_align: XAlign::Center,
                    y_align: YAlign::Top,
                    offset: Point::new(0.0, -0.03),
                    scale,
                },
            )],
            in_size: true,
        }
    }

    pub fn scaled(content: impl Into<Phrase>, scale: f32) -> Self {
        Phrase::Scaled {
            content: Box::new(content.into()),
            scale,
        }
    }

    /// Replace the options of a fraction phrase; other phrases are unchanged
    pub fn with_fraction_options(mut self, o: FractionOptions) -> Self {
        if let Phrase::Frac { options, .. } = &mut self {
            *options = o;
        }
        self
    }

    /// Resolve names against `scene` and build the layout tree
    pub fn build(&self, scene: &Scene) -> LayoutNode {
        self.try_build(scene)
            .unwrap_or_else(|| LayoutNode::sequence(Vec::new()))
    }

    fn try_build(&self, scene: &Scene) -> Option<LayoutNode> {
        let node = match self {
            Phrase::Element(name) => LayoutNode::leaf(lookup(scene, name)?),
            Phrase::Space(width) => LayoutNode::blank(*width),
            Phrase::Seq(items) => {
                LayoutNode::sequence(items.iter().filter_map(|p| p.try_build(scene)).collect())
            }
            Phrase::Frac {
                numerator,
                denominator,
                vinculum,
                options,
            } => LayoutNode::new(NodeKind::Fraction(Box::new(FractionNode {
                numerator: numerator.build(scene),
                denominator: denominator.build(scene),
                vinculum: glyph(scene, vinculum),
                options: *options,
            }))),
            Phrase::SupSub {
                content,
                superscript,
                subscript,
                options,
            } => LayoutNode::new(NodeKind::SuperSub(Box::new(SuperSubNode {
                content: content.build(scene),
                superscript: superscript.as_ref().and_then(|p| p.try_build(scene)),
                subscript: subscript.as_ref().and_then(|p| p.try_build(scene)),
                options: *options,
            }))),
            Phrase::Bracket {
                content,
                left,
                right,
                options,
            } => LayoutNode::new(NodeKind::Bracket(Box::new(BracketNode {
                content: content.build(scene),
                left: glyph(scene, left),
                right: glyph(scene, right),
                options: *options,
            }))),
            Phrase::Strike {
                content,
                line,
                options,
            } => LayoutNode::new(NodeKind::Strike(Box::new(StrikeNode {
                content: content.build(scene),
                line: glyph(scene, line),
                options: *options,
            }))),
            Phrase::Annotate {
                content,
                annotations,
                in_size,
            } => LayoutNode::new(NodeKind::Annotation(Box::new(AnnotationNode {
                content: content.build(scene),
                annotations: annotations
                    .iter()
                    .filter_map(|(p, placement)| {
                        p.try_build(scene).map(|node| Annotation {
                            node,
                            placement: *placement,
                        })
                    })
                    .collect(),
                in_size: *in_size,
            }))),
            Phrase::Scaled { content, scale } => content.build(scene).with_scale_modifier(*scale),
        };
        Some(node)
    }
}

fn lookup(scene: &Scene, name: &str) -> Option<ElementId> {
    let id = scene.id(name);
    if id.is_none() {
        tracing::warn!("phrase refers to unknown element '{}', skipping", name);
    }
    id
}

fn glyph(scene: &Scene, name: &Option<String>) -> Option<Glyph> {
    name.as_deref().and_then(|n| lookup(scene, n)).map(Glyph::new)
}
