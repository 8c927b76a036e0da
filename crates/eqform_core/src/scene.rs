//! Element arena
//!
//! [`Scene`] owns every element of one equation instance. Forms and layout
//! trees refer to elements by [`ElementId`] only, so cloning a form copies
//! handles rather than elements.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::element::{ElementId, SceneElement};
use crate::geometry::{Color, Transform};

/// Element transforms keyed by element, in a deterministic order
pub type TransformMap = IndexMap<ElementId, Transform>;

/// Collection-level operations used by the transition engine
pub trait SceneCollection {
    /// Every element, in insertion order
    fn all_elements(&self) -> Vec<ElementId>;

    /// Every currently visible element, in insertion order
    fn shown_elements(&self) -> Vec<ElementId>;

    fn hide_all(&mut self);

    /// Make the given elements visible at full opacity
    fn show(&mut self, ids: &[ElementId]);

    /// Show the given elements and hide everything else
    fn show_only(&mut self, ids: &[ElementId]);

    fn element_transforms(&self) -> TransformMap;

    /// Apply transforms; unknown ids are ignored
    fn set_element_transforms(&mut self, transforms: &TransformMap);
}

/// Arena of scene elements plus the collection transform
#[derive(Debug)]
pub struct Scene {
    elements: SlotMap<ElementId, Box<dyn SceneElement>>,
    order: Vec<ElementId>,
    names: FxHashMap<String, ElementId>,
    transform: Transform,
    opacity: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            elements: SlotMap::with_key(),
            order: Vec::new(),
            names: FxHashMap::default(),
            transform: Transform::IDENTITY,
            opacity: 1.0,
        }
    }

    /// Add an element. A later element with the same name takes over the name.
    pub fn insert<E: SceneElement + 'static>(&mut self, element: E) -> ElementId {
        let name = element.name().to_string();
        let id = self.elements.insert(Box::new(element));
        if let Some(previous) = self.names.insert(name.clone(), id) {
            tracing::warn!("element name '{}' redeclared, {:?} is no longer addressable", name, previous);
        }
        self.order.push(id);
        id
    }

    /// Look an element up by name
    pub fn id(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: ElementId) -> Option<&dyn SceneElement> {
        self.elements.get(id).map(|e| e.as_ref())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut (dyn SceneElement + 'static)> {
        self.elements.get_mut(id).map(|e| e.as_mut())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn name_of(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|e| e.name())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &dyn SceneElement)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|e| (*id, e)))
    }

    /// Collection-level transform (moves the whole equation)
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_color(&mut self, ids: &[ElementId], color: Color) {
        for id in ids {
            if let Some(e) = self.get_mut(*id) {
                e.set_color(color);
            }
        }
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.get(id).map(|e| e.is_visible()).unwrap_or(false)
    }
}

impl SceneCollection for Scene {
    fn all_elements(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    fn shown_elements(&self) -> Vec<ElementId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.is_visible(*id))
            .collect()
    }

    fn hide_all(&mut self) {
        for e in self.elements.values_mut() {
            e.set_visible(false);
        }
    }

    fn show(&mut self, ids: &[ElementId]) {
        for id in ids {
            if let Some(e) = self.get_mut(*id) {
                e.set_visible(true);
                e.set_opacity(1.0);
            }
        }
    }

    fn show_only(&mut self, ids: &[ElementId]) {
        self.hide_all();
        self.show(ids);
    }

    fn element_transforms(&self) -> TransformMap {
        self.order
            .iter()
            .filter_map(|id| self.get(*id).map(|e| (*id, e.transform())))
            .collect()
    }

    fn set_element_transforms(&mut self, transforms: &TransformMap) {
        for (id, t) in transforms {
            if let Some(e) = self.get_mut(*id) {
                e.set_transform(*t);
            }
        }
    }
}
