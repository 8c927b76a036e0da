//! Equation
//!
//! The owning facade: a scene of elements, the forms laid out over it, the
//! series navigator and the transition controller. All progress happens in
//! [`Equation::tick`].

use eqform_animation::{AnimTarget, MotionPath};
use eqform_core::{ElementId, Point, Scene, SceneCollection, SceneElement, TransformMap};
use eqform_layout::{layout, Anchor, ArrangeParams, EstimatedGlyphMetrics, GlyphMetrics, Phrase};
use indexmap::IndexMap;

use crate::config::{EquationConfig, PulseConfig};
use crate::error::Result;
use crate::form::{
    apply_mods, resolve_named, resolve_override, Form, FormAnchor, FormHook, FormOptions, FromWhere, PropertyPatch,
};
use crate::navigator::{restart_mode, FormNavigator};
use crate::transition::{
    Continuation, MotionMode, PulseSpec, StopMode, Timings, TransitionController, TransitionOutcome,
    TransitionTarget,
};

// ============================================================================
// Navigation requests
// ============================================================================

/// Which form a [`GoToForm`] request targets
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormTarget {
    Name(String),
    /// Index into the active series
    Index(usize),
    /// Next form of the active series
    Next,
}

/// What a new request does when a transition is already running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IfAnimating {
    /// Complete the running transition (snap to its target) instead of
    /// freezing it
    pub skip_to_target: bool,
    /// Drop the new request after stopping the running one
    pub cancel_go_to: bool,
}

impl Default for IfAnimating {
    fn default() -> Self {
        Self {
            skip_to_target: true,
            cancel_go_to: true,
        }
    }
}

/// Request for [`Equation::go_to_form`]
pub struct GoToForm {
    pub target: FormTarget,
    pub animate: MotionMode,
    /// `Some(0.0)` jumps without animating; `None` uses the form's duration
    /// or the velocity model
    pub duration: Option<f32>,
    pub delay: f32,
    pub from_where: Option<FromWhere>,
    /// Form and override durations win over the request's duration
    pub prioritize_form_duration: bool,
    pub if_animating: IfAnimating,
    pub fade_out: Option<f32>,
    pub blank: Option<f32>,
    pub fade_in: Option<f32>,
    pub callback: Option<Continuation>,
}

impl Default for GoToForm {
    fn default() -> Self {
        Self {
            target: FormTarget::Next,
            animate: MotionMode::Move,
            duration: None,
            delay: 0.0,
            from_where: None,
            prioritize_form_duration: true,
            if_animating: IfAnimating::default(),
            fade_out: None,
            blank: None,
            fade_in: None,
            callback: None,
        }
    }
}

impl std::fmt::Debug for GoToForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoToForm")
            .field("target", &self.target)
            .field("animate", &self.animate)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("from_where", &self.from_where)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl GoToForm {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            target: FormTarget::Name(name.into()),
            ..Default::default()
        }
    }

    pub fn index(index: usize) -> Self {
        Self {
            target: FormTarget::Index(index),
            ..Default::default()
        }
    }

    pub fn next_in_series() -> Self {
        Self::default()
    }

    pub fn with_animate(mut self, mode: MotionMode) -> Self {
        self.animate = mode;
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_from_where(mut self, from: FromWhere) -> Self {
        self.from_where = Some(from);
        self
    }

    pub fn with_prioritize_form_duration(mut self, prioritize: bool) -> Self {
        self.prioritize_form_duration = prioritize;
        self
    }

    pub fn with_if_animating(mut self, skip_to_target: bool, cancel_go_to: bool) -> Self {
        self.if_animating = IfAnimating {
            skip_to_target,
            cancel_go_to,
        };
        self
    }

    pub fn with_fades(mut self, fade_out: f32, blank: f32, fade_in: f32) -> Self {
        self.fade_out = Some(fade_out);
        self.blank = Some(blank);
        self.fade_in = Some(fade_in);
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(TransitionOutcome) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }
}

// ============================================================================
// Equation
// ============================================================================

/// An equation with named forms and animated transitions between them
pub struct Equation {
    scene: Scene,
    metrics: Box<dyn GlyphMetrics>,
    config: EquationConfig,
    forms: IndexMap<String, Form>,
    navigator: FormNavigator,
    controller: TransitionController,
}

impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Equation")
            .field("elements", &self.scene.len())
            .field("forms", &self.forms.keys().collect::<Vec<_>>())
            .field("current", &self.navigator.current())
            .field("controller", &self.controller)
            .finish()
    }
}

impl Default for Equation {
    fn default() -> Self {
        Self::new(EquationConfig::default())
    }
}

impl Equation {
    pub fn new(config: EquationConfig) -> Self {
        Self::with_metrics(config, EstimatedGlyphMetrics::default())
    }

    pub fn with_metrics<M: GlyphMetrics + 'static>(config: EquationConfig, metrics: M) -> Self {
        let controller = TransitionController::new(config.velocity, config.easing);
        Self {
            scene: Scene::new(),
            metrics: Box::new(metrics),
            config,
            forms: IndexMap::new(),
            navigator: FormNavigator::new(),
            controller,
        }
    }

    pub fn config(&self) -> &EquationConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn add_element<E: SceneElement + 'static>(&mut self, element: E) -> ElementId {
        self.scene.insert(element)
    }

    /// Element handle by name
    pub fn element(&self, name: &str) -> Option<ElementId> {
        self.scene.id(name)
    }

    // ========================================================================
    // Forms
    // ========================================================================

    /// Lay out a new form. The scene is not changed; the form's transforms
    /// are pushed when it is shown or animated to.
    ///
    /// The first form added becomes the current form. Adding a form under
    /// an existing name replaces it.
    pub fn add_form(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Phrase>,
        options: FormOptions,
    ) -> Result<()> {
        let name = name.into();
        let mut node = content.into().build(&self.scene);

        let alignment = options.alignment.unwrap_or(self.config.alignment);
        let anchor = match &options.anchor {
            None => Anchor::default(),
            Some(FormAnchor::Point(p)) => Anchor::Point(*p),
            Some(FormAnchor::Element(element)) => match self.scene.id(element) {
                Some(id) => Anchor::Element(id),
                None => {
                    tracing::warn!(
                        "form '{}' anchors to unknown element '{}', using origin",
                        name,
                        element
                    );
                    Anchor::default()
                }
            },
        };
        let params = ArrangeParams::new(options.scale.unwrap_or(self.config.scale))
            .with_alignment(alignment.x, alignment.y)
            .with_anchor(anchor);

        let arranged = layout(&mut node, &self.scene, self.metrics.as_ref(), &params)?;

        let form = Form {
            name: name.clone(),
            elements: node.elements(),
            content: node,
            params,
            transforms: arranged.transforms,
            bounds: arranged.bounds,
            location: arranged.location,
            element_mods: resolve_named(&self.scene, &options.element_mods, "element mod"),
            description: options.description.clone(),
            duration: options.duration,
            motion: resolve_named(&self.scene, &options.motion, "motion hint"),
            from_form: options
                .from_form
                .iter()
                .map(|(from, o)| (from.clone(), resolve_override(&self.scene, o)))
                .collect(),
            on_transition: options.on_transition.clone(),
            on_show: options.on_show.clone(),
        };
        tracing::debug!("added form '{}' with {} elements", name, form.elements.len());

        if self.forms.insert(name.clone(), form).is_some() {
            tracing::debug!("form '{}' replaced", name);
        }
        self.navigator.register_form(&name);
        if self.navigator.current().is_none() {
            self.navigator.set_current(name);
        }
        Ok(())
    }

    pub fn form(&self, name: &str) -> Option<&Form> {
        self.forms.get(name)
    }

    pub fn form_names(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(String::as_str)
    }

    pub fn current_form_name(&self) -> Option<&str> {
        self.navigator.current()
    }

    pub fn current_form(&self) -> Option<&Form> {
        self.navigator.current().and_then(|name| self.forms.get(name))
    }

    pub fn set_description(&mut self, form: &str, description: impl Into<String>) {
        match self.forms.get_mut(form) {
            Some(f) => f.description = Some(description.into()),
            None => tracing::debug!("no form named '{}' to describe", form),
        }
    }

    pub fn description(&self, form: &str) -> Option<&str> {
        self.forms.get(form)?.description.as_deref()
    }

    // ========================================================================
    // Series
    // ========================================================================

    pub fn add_form_series<I, S>(&mut self, name: &str, forms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let forms: Vec<String> = forms.into_iter().map(Into::into).collect();
        for f in forms.iter().filter(|f| !self.forms.contains_key(f.as_str())) {
            tracing::warn!("series '{}' names unknown form '{}'", name, f);
        }
        self.navigator.add_series(name, forms);
    }

    pub fn set_active_series(&mut self, name: &str) -> bool {
        self.navigator.set_active_series(name)
    }

    pub fn navigator(&self) -> &FormNavigator {
        &self.navigator
    }

    // ========================================================================
    // Showing and navigating
    // ========================================================================

    /// Show a form immediately, freezing any running transition
    pub fn show_form(&mut self, name: &str) {
        self.controller.stop(StopMode::Cancel, &mut self.scene);
        let Some(form) = self.forms.get(name) else {
            tracing::debug!("show_form: no form named '{}'", name);
            return;
        };
        self.scene.show_only(&form.elements);
        self.scene.set_element_transforms(&form.transforms);
        apply_mods(&mut self.scene, &form.element_mods);
        self.navigator.set_current(name);
    }

    /// Transition to a form. Unknown targets are ignored.
    pub fn go_to_form(&mut self, mut request: GoToForm) {
        if self.controller.is_animating() {
            if request.if_animating.skip_to_target {
                self.controller.stop(StopMode::Complete, &mut self.scene);
                if let Some(current) = self.navigator.current().map(str::to_string) {
                    self.show_form(&current);
                }
            } else {
                self.controller.stop(StopMode::Cancel, &mut self.scene);
            }
            if request.if_animating.cancel_go_to {
                tracing::debug!("go_to_form dropped: a transition was running");
                return;
            }
        }

        let name = match &request.target {
            FormTarget::Name(name) => self.forms.contains_key(name).then(|| name.clone()),
            FormTarget::Index(i) => self.navigator.at(*i).map(str::to_string),
            FormTarget::Next => self.navigator.next_step().map(|step| step.name),
        };
        let Some(name) = name.filter(|n| self.forms.contains_key(n)) else {
            tracing::debug!("go_to_form: no form for {:?}", request.target);
            return;
        };

        request.animate = self.restart_fallback(request.animate);
        let departing = self.navigator.current().map(str::to_string);
        let Some((target, duration)) = self.resolve_target(&name, &request, departing.as_deref()) else {
            return;
        };

        if duration == Some(0.0) {
            tracing::debug!("jumping to form '{}'", name);
            self.show_form(&name);
            if let Some(callback) = request.callback.take() {
                callback(TransitionOutcome::Finished);
            }
            return;
        }

        let mode = request.animate;
        let timings = self.timings(mode, duration, &request);
        let (on_transition, on_show) = match self.forms.get(&name) {
            Some(form) => (
                form.transition_hook(request.from_where.as_ref(), departing.as_deref())
                    .cloned(),
                form.on_show.clone(),
            ),
            None => (None, None),
        };
        let continuation = with_show_hook(&name, on_show, request.callback.take());

        if let Some(hook) = on_transition {
            hook.call(&name);
        }
        self.navigator.set_current(name);
        self.controller
            .begin(&mut self.scene, target, mode, timings, continuation);
    }

    /// Move-schedule transition that replaces any running transition
    pub fn animate_to_form(&mut self, name: &str, duration: Option<f32>, delay: f32) {
        let mut request = GoToForm::name(name)
            .with_delay(delay)
            .with_if_animating(false, false);
        request.duration = duration;
        self.go_to_form(request);
    }

    /// Advance to the next form of the active series. Wrapping to the first
    /// form uses the configured restart mode.
    pub fn next_form(&mut self, duration: Option<f32>, delay: f32) {
        let Some(step) = self.navigator.next_step() else {
            tracing::debug!("next_form: nothing to advance to");
            return;
        };
        let mode = if step.wrapped {
            restart_mode(&self.config.restart)
        } else {
            MotionMode::Move
        };
        let mut request = GoToForm::name(step.name)
            .with_animate(mode)
            .with_delay(delay)
            .with_from_where(FromWhere::Prev);
        request.duration = duration;
        self.go_to_form(request);
    }

    pub fn prev_form(&mut self, duration: Option<f32>, delay: f32) {
        let Some(step) = self.navigator.prev_step() else {
            tracing::debug!("prev_form: nothing to go back to");
            return;
        };
        let mut request = GoToForm::name(step.name)
            .with_delay(delay)
            .with_from_where(FromWhere::Next);
        request.duration = duration;
        self.go_to_form(request);
    }

    /// Replay the transition into the current form. While a transition is
    /// running this completes it instead.
    pub fn replay_current_form(&mut self, duration: Option<f32>) {
        let Some(current) = self.navigator.current().map(str::to_string) else {
            return;
        };
        if self.controller.is_animating() {
            self.controller.stop(StopMode::Complete, &mut self.scene);
            self.show_form(&current);
            return;
        }
        let Some(prev) = self.navigator.prev_step() else {
            tracing::debug!("replay: '{}' has no previous form", current);
            return;
        };
        self.show_form(&prev.name);
        let mode = if prev.wrapped {
            restart_mode(&self.config.restart)
        } else {
            MotionMode::Move
        };
        let mut request = GoToForm::name(current)
            .with_animate(mode)
            .with_delay(self.config.timing.replay_delay)
            .with_from_where(FromWhere::Prev);
        request.duration = duration;
        self.go_to_form(request);
    }

    /// Animate elements to explicit transforms. Returns the duration used.
    pub fn animate_to_transforms(
        &mut self,
        transforms: &TransformMap,
        duration: Option<f32>,
        delay: f32,
    ) -> f32 {
        self.controller
            .animate_to_transforms(&mut self.scene, transforms, duration, delay, None)
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Advance time by `dt` seconds. Returns whether a transition is running.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.controller.tick(dt, &mut self.scene)
    }

    pub fn stop(&mut self, mode: StopMode) {
        self.controller.stop(mode, &mut self.scene);
    }

    pub fn request_stop(&mut self, mode: StopMode) {
        self.controller.request_stop(mode);
    }

    pub fn is_animating(&self) -> bool {
        self.controller.is_animating()
    }

    pub fn transition(&self) -> &TransitionController {
        &self.controller
    }

    // ========================================================================
    // Request resolution
    // ========================================================================

    fn resolve_target(
        &self,
        name: &str,
        request: &GoToForm,
        departing: Option<&str>,
    ) -> Option<(TransitionTarget, Option<f32>)> {
        let form = self.forms.get(name)?;
        let over = form.override_for(request.from_where.as_ref(), departing);

        let over_duration = over.and_then(|o| o.duration);
        let duration = if request.prioritize_form_duration {
            over_duration.or(form.duration).or(request.duration)
        } else {
            request.duration.or(over_duration).or(form.duration)
        };

        let mut motion: IndexMap<ElementId, MotionPath> = form.motion.clone();
        let mut element_mods: IndexMap<ElementId, PropertyPatch> = form.element_mods.clone();
        if let Some(o) = over {
            motion.extend(o.motion.iter().map(|(id, p)| (*id, *p)));
            element_mods.extend(o.element_mods.iter().map(|(id, p)| (*id, *p)));
        }

        let pulse = match (request.animate, &self.config.restart.pulse) {
            (MotionMode::Pulse, Some(config)) => Some(self.pulse_spec(form, config)),
            _ => None,
        };
        let collection_from = match (request.animate, self.config.restart.move_from) {
            (MotionMode::MoveFrom, Some(p)) => Some(self.scene.transform().with_translation(p)),
            _ => None,
        };

        let target = TransitionTarget {
            form: form.name.clone(),
            elements: form.elements.clone(),
            transforms: form.transforms.clone(),
            element_mods,
            motion,
            pulse,
            collection_from,
        };
        Some((target, duration))
    }

    /// Restart modes fall back to a dissolve when the restart behaviour
    /// they need is not configured
    fn restart_fallback(&self, mode: MotionMode) -> MotionMode {
        let restart = &self.config.restart;
        match mode {
            MotionMode::MoveFrom if restart.move_from.is_none() => MotionMode::Dissolve,
            MotionMode::Pulse if restart.pulse.is_none() => MotionMode::Dissolve,
            mode => mode,
        }
    }

    fn pulse_spec(&self, form: &Form, config: &PulseConfig) -> PulseSpec {
        let element = config.element.as_deref().and_then(|n| self.scene.id(n));
        let (target, centre) = match element.and_then(|id| Some((id, form.content.find_leaf(id)?))) {
            Some((id, (location, bounds))) => (
                AnimTarget::Element(id),
                Point::new(
                    location.x + bounds.width / 2.0,
                    location.y - bounds.descent + bounds.height / 2.0,
                ),
            ),
            None => (AnimTarget::Collection, self.scene.transform().apply(form.centre())),
        };
        PulseSpec {
            target,
            centre,
            scale: config.scale,
            duration: config.duration,
        }
    }

    fn timings(&self, mode: MotionMode, duration: Option<f32>, request: &GoToForm) -> Timings {
        let t = &self.config.timing;
        let mut timings = Timings {
            delay: request.delay,
            fade_out: t.fade_out,
            move_duration: duration,
            blank: t.blank,
            fade_in: t.fade_in,
        };
        if let (MotionMode::Dissolve | MotionMode::Pulse, Some(d)) = (mode, duration) {
            if d > 0.0 {
                let split = &self.config.dissolve_split;
                timings.fade_out = split.fade_out * d;
                timings.blank = split.blank * d;
                timings.fade_in = split.fade_in * d;
            }
        }
        if let Some(v) = request.fade_out {
            timings.fade_out = v;
        }
        if let Some(v) = request.blank {
            timings.blank = v;
        }
        if let Some(v) = request.fade_in {
            timings.fade_in = v;
        }
        timings
    }
}

/// Run the form's `on_show` hook ahead of the request callback
fn with_show_hook(form: &str, on_show: Option<FormHook>, callback: Option<Continuation>) -> Option<Continuation> {
    if on_show.is_none() && callback.is_none() {
        return None;
    }
    let form = form.to_string();
    Some(Box::new(move |outcome| {
        if let Some(hook) = on_show {
            hook.call(&form);
        }
        if let Some(callback) = callback {
            callback(outcome);
        }
    }))
}
