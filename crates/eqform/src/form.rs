//! Forms
//!
//! A [`Form`] is one named arrangement of an equation: a private layout
//! tree, the transforms it resolved to, per-element property patches and
//! the timing hints used when a transition arrives at it.

use eqform_animation::MotionPath;
use eqform_core::{Bounds, Color, ElementId, Point, Scene, SceneElement, TransformMap};
use eqform_layout::{Alignment, ArrangeParams, LayoutNode};
use indexmap::IndexMap;
use std::rc::Rc;

/// Property overrides applied to an element when its form is reached
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PropertyPatch {
    pub color: Option<Color>,
    pub opacity: Option<f32>,
}

impl PropertyPatch {
    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            opacity: None,
        }
    }

    pub fn opacity(opacity: f32) -> Self {
        Self {
            color: None,
            opacity: Some(opacity),
        }
    }

    pub fn apply(&self, element: &mut dyn SceneElement) {
        if let Some(color) = self.color {
            element.set_color(color);
        }
        if let Some(opacity) = self.opacity {
            element.set_opacity(opacity);
        }
    }
}

/// Apply every patch in `mods` to the scene
pub fn apply_mods(scene: &mut Scene, mods: &IndexMap<ElementId, PropertyPatch>) {
    for (id, patch) in mods {
        if let Some(e) = scene.get_mut(*id) {
            patch.apply(e);
        }
    }
}

/// Callback attached to a form, called with the form's name. Unlike a
/// request callback it fires on every transition into the form.
#[derive(Clone)]
pub struct FormHook(Rc<dyn Fn(&str)>);

impl FormHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, form: &str) {
        (self.0)(form)
    }
}

impl std::fmt::Debug for FormHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FormHook")
    }
}

impl PartialEq for FormHook {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Where a transition arrives from, used to pick an [`AnimationOverride`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FromWhere {
    /// Arriving from the previous form of the series (moving forward)
    Prev,
    /// Arriving from the next form of the series (moving backward)
    Next,
    /// Arriving from a specific form
    Form(String),
}

/// Timing and motion used when arriving from a particular form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationOverride {
    pub duration: Option<f32>,
    pub motion: IndexMap<ElementId, MotionPath>,
    pub element_mods: IndexMap<ElementId, PropertyPatch>,
    /// Replaces the form's `on_transition` for this arrival
    pub on_transition: Option<FormHook>,
}

/// A laid-out, named arrangement of the equation
#[derive(Clone, Debug)]
pub struct Form {
    pub name: String,
    pub content: LayoutNode,
    pub params: ArrangeParams,
    /// Every element the form shows, in layout order
    pub elements: Vec<ElementId>,
    /// Resolved transform of every element in `elements`
    pub transforms: TransformMap,
    pub bounds: Bounds,
    pub location: Point,
    pub element_mods: IndexMap<ElementId, PropertyPatch>,
    pub description: Option<String>,
    pub duration: Option<f32>,
    pub motion: IndexMap<ElementId, MotionPath>,
    pub from_form: IndexMap<FromWhere, AnimationOverride>,
    /// Fired when an animated transition into the form starts
    pub on_transition: Option<FormHook>,
    /// Fired when a transition into the form ends, before the request callback
    pub on_show: Option<FormHook>,
}

impl Form {
    /// Centre of the form's box in equation space
    pub fn centre(&self) -> Point {
        Point::new(
            self.location.x + self.bounds.width / 2.0,
            self.location.y - self.bounds.descent + self.bounds.height / 2.0,
        )
    }

    /// Override for a transition arriving from `from`, falling back to the
    /// override keyed by the departing form's name
    pub fn override_for(&self, from: Option<&FromWhere>, departing: Option<&str>) -> Option<&AnimationOverride> {
        from.and_then(|key| self.from_form.get(key)).or_else(|| {
            departing.and_then(|name| self.from_form.get(&FromWhere::Form(name.to_string())))
        })
    }

    /// Transition hook for an arrival, preferring the override's
    pub fn transition_hook(&self, from: Option<&FromWhere>, departing: Option<&str>) -> Option<&FormHook> {
        self.override_for(from, departing)
            .and_then(|o| o.on_transition.as_ref())
            .or(self.on_transition.as_ref())
    }
}

// ============================================================================
// Form options (name-level, resolved when the form is added)
// ============================================================================

/// Anchor given by point or by element name
#[derive(Clone, Debug, PartialEq)]
pub enum FormAnchor {
    Point(Point),
    Element(String),
}

/// Override options keyed by element names
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverrideOptions {
    pub duration: Option<f32>,
    pub motion: Vec<(String, MotionPath)>,
    pub element_mods: Vec<(String, PropertyPatch)>,
    pub on_transition: Option<FormHook>,
}

impl OverrideOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_motion(mut self, element: impl Into<String>, path: MotionPath) -> Self {
        self.motion.push((element.into(), path));
        self
    }

    pub fn with_mod(mut self, element: impl Into<String>, patch: PropertyPatch) -> Self {
        self.element_mods.push((element.into(), patch));
        self
    }

    pub fn on_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.on_transition = Some(FormHook::new(f));
        self
    }
}

/// Options for [`Equation::add_form`](crate::Equation::add_form)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormOptions {
    pub scale: Option<f32>,
    pub alignment: Option<Alignment>,
    pub anchor: Option<FormAnchor>,
    pub element_mods: Vec<(String, PropertyPatch)>,
    pub description: Option<String>,
    pub duration: Option<f32>,
    pub motion: Vec<(String, MotionPath)>,
    pub from_form: Vec<(FromWhere, OverrideOptions)>,
    pub on_transition: Option<FormHook>,
    pub on_show: Option<FormHook>,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_anchor_point(mut self, point: Point) -> Self {
        self.anchor = Some(FormAnchor::Point(point));
        self
    }

    pub fn with_anchor_element(mut self, element: impl Into<String>) -> Self {
        self.anchor = Some(FormAnchor::Element(element.into()));
        self
    }

    pub fn with_mod(mut self, element: impl Into<String>, patch: PropertyPatch) -> Self {
        self.element_mods.push((element.into(), patch));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_motion(mut self, element: impl Into<String>, path: MotionPath) -> Self {
        self.motion.push((element.into(), path));
        self
    }

    pub fn from_prev(mut self, options: OverrideOptions) -> Self {
        self.from_form.push((FromWhere::Prev, options));
        self
    }

    pub fn from_next(mut self, options: OverrideOptions) -> Self {
        self.from_form.push((FromWhere::Next, options));
        self
    }

    pub fn from_form(mut self, form: impl Into<String>, options: OverrideOptions) -> Self {
        self.from_form.push((FromWhere::Form(form.into()), options));
        self
    }

    pub fn on_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.on_transition = Some(FormHook::new(f));
        self
    }

    pub fn on_show<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.on_show = Some(FormHook::new(f));
        self
    }
}

/// Resolve element names to handles, skipping unknown names
pub(crate) fn resolve_named<T: Clone>(scene: &Scene, items: &[(String, T)], what: &str) -> IndexMap<ElementId, T> {
    items
        .iter()
        .filter_map(|(name, value)| match scene.id(name) {
            Some(id) => Some((id, value.clone())),
            None => {
                tracing::warn!("{} refers to unknown element '{}', skipping", what, name);
                None
            }
        })
        .collect()
}

pub(crate) fn resolve_override(scene: &Scene, options: &OverrideOptions) -> AnimationOverride {
    AnimationOverride {
        duration: options.duration,
        motion: resolve_named(scene, &options.motion, "motion hint"),
        element_mods: resolve_named(scene, &options.element_mods, "element mod"),
        on_transition: options.on_transition.clone(),
    }
}
