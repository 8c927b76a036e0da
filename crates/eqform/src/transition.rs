//! Transition orchestration
//!
//! [`TransitionController`] owns the single in-flight transition of an
//! equation. A transition is a queue of stages run one after another; an
//! animated stage registers one scheduler group and the next stage starts
//! when that group's counting join reports completion. Instant stages
//! (property patches, placing elements) run without consuming time.

use std::collections::VecDeque;

use eqform_animation::{
    AnimTarget, AnimationScheduler, Easing, ElementAnimation, GroupId, MotionPath, VelocityLimits,
};
use eqform_core::{ElementId, Point, Scene, SceneCollection, SceneElement, Transform, TransformMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::form::{apply_mods, PropertyPatch};
use crate::reconcile::{self, ElementDiff};

/// How a transition gets from the shown elements to the target form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Fade everything out, place the target, fade everything in
    Dissolve,
    /// Fade out removed elements, move kept ones, fade in new ones
    #[default]
    Move,
    /// Fade out removed elements, fade in new ones, then move kept ones
    DissolveInThenMove,
    /// Move kept elements first, then fade out and fade in
    MoveThenFade,
    /// Dissolve out, then slide the whole equation in from the restart point
    MoveFrom,
    /// Dissolve, then scale-pulse the equation (or one element)
    Pulse,
}

/// How an in-flight transition is stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopMode {
    /// Snap everything to the target and report the transition as cancelled
    Complete,
    /// Freeze at the current interpolated values and drop the continuation
    Cancel,
}

/// Reported to the continuation when a transition ends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    Finished,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Animating,
    /// A stop was requested and is applied at the next tick
    CancelRequested(StopMode),
}

/// Completion continuation of a transition
pub type Continuation = Box<dyn FnOnce(TransitionOutcome)>;

/// Stage durations of one transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timings {
    pub delay: f32,
    pub fade_out: f32,
    /// `None` derives the move time from the velocity limits
    pub move_duration: Option<f32>,
    pub blank: f32,
    pub fade_in: f32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            delay: 0.0,
            fade_out: 0.4,
            move_duration: None,
            blank: 0.2,
            fade_in: 0.4,
        }
    }
}

/// Scale pulse played at the end of a pulse transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseSpec {
    pub target: AnimTarget,
    /// Fixed point of the scaling, in the target's parent space
    pub centre: Point,
    pub scale: f32,
    pub duration: f32,
}

/// Resolved end state of a transition
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionTarget {
    pub form: String,
    pub elements: Vec<ElementId>,
    pub transforms: TransformMap,
    pub element_mods: IndexMap<ElementId, PropertyPatch>,
    pub motion: IndexMap<ElementId, MotionPath>,
    pub pulse: Option<PulseSpec>,
    /// Collection transform the equation slides in from (move-from restarts)
    pub collection_from: Option<Transform>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Delay,
    FadeOut,
    ApplyMods,
    Place,
    ShowTarget,
    Move,
    Blank,
    FadeIn,
    MoveCollection,
    Pulse,
}

/// Summary of one planned stage
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedStage {
    pub kind: StageKind,
    /// `None` for instant stages and velocity-derived moves
    pub duration: Option<f32>,
    /// Number of elements the stage acts on
    pub elements: usize,
}

#[derive(Clone, Debug)]
enum Stage {
    Delay(f32),
    Blank(f32),
    FadeOut { ids: Vec<ElementId>, duration: f32 },
    FadeIn { ids: Vec<ElementId>, duration: f32 },
    ApplyMods,
    /// Set every target transform without changing visibility
    Place,
    ShowTarget,
    Move { ids: Vec<ElementId>, duration: Option<f32> },
    MoveCollection { from: Transform, to: Transform, duration: Option<f32> },
    Pulse(PulseSpec),
}

impl Stage {
    fn summary(&self) -> PlannedStage {
        let (kind, duration, elements) = match self {
            Stage::Delay(t) => (StageKind::Delay, Some(*t), 0),
            Stage::Blank(t) => (StageKind::Blank, Some(*t), 0),
            Stage::FadeOut { ids, duration } => (StageKind::FadeOut, Some(*duration), ids.len()),
            Stage::FadeIn { ids, duration } => (StageKind::FadeIn, Some(*duration), ids.len()),
            Stage::ApplyMods => (StageKind::ApplyMods, None, 0),
            Stage::Place => (StageKind::Place, None, 0),
            Stage::ShowTarget => (StageKind::ShowTarget, None, 0),
            Stage::Move { ids, duration } => (StageKind::Move, *duration, ids.len()),
            Stage::MoveCollection { duration, .. } => (StageKind::MoveCollection, *duration, 0),
            Stage::Pulse(p) => (StageKind::Pulse, Some(p.duration), 0),
        };
        PlannedStage {
            kind,
            duration,
            elements,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Active {
    Wait(f32),
    Group(GroupId),
}

/// Drives one transition at a time
pub struct TransitionController {
    state: TransitionState,
    scheduler: AnimationScheduler,
    plan: VecDeque<Stage>,
    active: Option<Active>,
    target: TransitionTarget,
    continuation: Option<Continuation>,
    mode: Option<MotionMode>,
    schedule: Vec<PlannedStage>,
    diff: ElementDiff,
    velocity: VelocityLimits,
    easing: Easing,
}

impl std::fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionController")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("target", &self.target.form)
            .field("pending_stages", &self.plan.len())
            .field("active", &self.active)
            .finish()
    }
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(VelocityLimits::default(), Easing::default())
    }
}

impl TransitionController {
    pub fn new(velocity: VelocityLimits, easing: Easing) -> Self {
        Self {
            state: TransitionState::Idle,
            scheduler: AnimationScheduler::new(),
            plan: VecDeque::new(),
            active: None,
            target: TransitionTarget::default(),
            continuation: None,
            mode: None,
            schedule: Vec::new(),
            diff: ElementDiff::default(),
            velocity,
            easing,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state != TransitionState::Idle
    }

    /// Mode of the current (or most recent) transition
    pub fn mode(&self) -> Option<MotionMode> {
        self.mode
    }

    /// Stages of the current (or most recent) transition, in order
    pub fn schedule(&self) -> &[PlannedStage] {
        &self.schedule
    }

    /// Planned duration of the first stage of `kind`
    pub fn planned(&self, kind: StageKind) -> Option<f32> {
        self.schedule
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| s.duration)
    }

    /// Reconciliation of the current (or most recent) transition
    pub fn diff(&self) -> &ElementDiff {
        &self.diff
    }

    /// Name of the form the current (or most recent) transition targets
    pub fn target_form(&self) -> &str {
        &self.target.form
    }

    /// Start a transition. Any transition still in flight is cancelled.
    ///
    /// Stages with zero duration run immediately, so a transition whose
    /// timings are all zero finishes (and fires its continuation) inside
    /// this call.
    pub fn begin(
        &mut self,
        scene: &mut Scene,
        target: TransitionTarget,
        mode: MotionMode,
        timings: Timings,
        continuation: Option<Continuation>,
    ) {
        if self.is_animating() {
            self.stop(StopMode::Cancel, scene);
        }

        // A restart mode without its restart target is a plain dissolve
        let mode = match mode {
            MotionMode::MoveFrom if target.collection_from.is_none() => MotionMode::Dissolve,
            MotionMode::Pulse if target.pulse.is_none() => MotionMode::Dissolve,
            mode => mode,
        };

        let shown = scene.shown_elements();
        let current = scene.element_transforms();
        self.diff = reconcile::diff(&target.elements, &target.transforms, &shown, &current);
        self.plan = build_plan(mode, &timings, &self.diff, &shown, &target, scene.transform());
        self.schedule = self.plan.iter().map(Stage::summary).collect();

        tracing::debug!(
            "transition to '{}' ({:?}): show {}, hide {}, move {}",
            target.form,
            mode,
            self.diff.to_show.len(),
            self.diff.to_hide.len(),
            self.diff.to_move.len()
        );

        self.target = target;
        self.mode = Some(mode);
        self.continuation = continuation;
        self.active = None;
        self.state = TransitionState::Animating;
        self.advance(0.0, scene);
    }

    /// Advance the transition clock by `dt` seconds. Returns whether a
    /// transition is still in flight.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> bool {
        match self.state {
            TransitionState::Idle => return false,
            TransitionState::CancelRequested(mode) => {
                self.stop(mode, scene);
                return false;
            }
            TransitionState::Animating => {}
        }

        let finished = self.scheduler.tick(dt, scene);
        let carry = match self.active {
            Some(Active::Group(group)) => match finished.iter().find(|f| f.group == group) {
                Some(f) => {
                    self.active = None;
                    f.overshoot
                }
                None => 0.0,
            },
            Some(Active::Wait(remaining)) => {
                let left = remaining - dt;
                if left <= 0.0 {
                    self.active = None;
                    -left
                } else {
                    self.active = Some(Active::Wait(left));
                    0.0
                }
            }
            None => dt,
        };
        if self.active.is_none() {
            self.advance(carry, scene);
        }
        self.is_animating()
    }

    /// Stop at the next tick boundary
    pub fn request_stop(&mut self, mode: StopMode) {
        if self.state == TransitionState::Animating {
            self.state = TransitionState::CancelRequested(mode);
        }
    }

    /// Stop immediately
    pub fn stop(&mut self, mode: StopMode, scene: &mut Scene) {
        if !self.is_animating() {
            return;
        }
        match mode {
            StopMode::Complete => {
                self.scheduler.finish_all(scene);
                let pending: Vec<Stage> = self.plan.drain(..).collect();
                for stage in pending {
                    self.settle(stage, scene);
                }
                tracing::debug!("transition to '{}' completed early", self.target.form);
                self.finish(TransitionOutcome::Cancelled);
            }
            StopMode::Cancel => {
                self.scheduler.cancel_all();
                self.plan.clear();
                self.active = None;
                self.continuation = None;
                self.state = TransitionState::Idle;
                tracing::debug!("transition to '{}' cancelled", self.target.form);
            }
        }
    }

    /// Animate a set of element transforms outside of any form transition.
    /// Returns the duration actually used.
    pub fn animate_to_transforms(
        &mut self,
        scene: &mut Scene,
        transforms: &TransformMap,
        duration: Option<f32>,
        delay: f32,
        continuation: Option<Continuation>,
    ) -> f32 {
        let current = scene.element_transforms();
        let moves: Vec<ElementId> = transforms
            .iter()
            .filter(|(id, t)| current.get(*id).is_some_and(|c| c != *t))
            .map(|(id, _)| *id)
            .collect();
        let d = duration.unwrap_or_else(|| {
            self.velocity.max_move_time(
                moves
                    .iter()
                    .filter_map(|id| Some((current.get(id)?, transforms.get(id)?))),
            )
        });
        let target = TransitionTarget {
            form: String::new(),
            elements: Vec::new(),
            transforms: transforms.clone(),
            ..Default::default()
        };
        if self.is_animating() {
            self.stop(StopMode::Cancel, scene);
        }
        self.diff = ElementDiff {
            to_move: moves.clone(),
            ..Default::default()
        };
        self.plan = VecDeque::from(vec![
            Stage::Delay(delay),
            Stage::Move {
                ids: moves,
                duration: Some(d),
            },
        ]);
        self.schedule = self.plan.iter().map(Stage::summary).collect();
        self.target = target;
        self.mode = Some(MotionMode::Move);
        self.continuation = continuation;
        self.active = None;
        self.state = TransitionState::Animating;
        self.advance(0.0, scene);
        d
    }

    // ========================================================================
    // Stage sequencing
    // ========================================================================

    /// Start stages until one is left running; `carry` is frame time that
    /// the finished stage did not use
    fn advance(&mut self, mut carry: f32, scene: &mut Scene) {
        while self.active.is_none() {
            let Some(stage) = self.plan.pop_front() else {
                tracing::debug!("transition to '{}' finished", self.target.form);
                self.finish(TransitionOutcome::Finished);
                return;
            };
            tracing::trace!("stage {:?}", stage.summary().kind);
            match self.start(stage, scene) {
                None => {}
                Some(Active::Wait(t)) => {
                    if carry >= t {
                        carry -= t;
                    } else {
                        self.active = Some(Active::Wait(t - carry));
                        carry = 0.0;
                    }
                }
                Some(Active::Group(group)) => {
                    self.active = Some(Active::Group(group));
                    if carry > 0.0 {
                        let finished = self.scheduler.tick(carry, scene);
                        carry = 0.0;
                        if let Some(f) = finished.iter().find(|f| f.group == group) {
                            self.active = None;
                            carry = f.overshoot;
                        }
                    }
                }
            }
        }
    }

    fn finish(&mut self, outcome: TransitionOutcome) {
        self.state = TransitionState::Idle;
        self.active = None;
        self.plan.clear();
        if let Some(continuation) = self.continuation.take() {
            continuation(outcome);
        }
    }

    fn anim_group<I>(&mut self, animations: I) -> Option<Active>
    where
        I: IntoIterator<Item = ElementAnimation>,
    {
        let easing = self.easing;
        let group = self
            .scheduler
            .add_group(animations.into_iter().map(|a| a.with_easing(easing)));
        Some(Active::Group(group))
    }

    /// Begin a stage. Returns what is left running, or `None` for stages
    /// that completed on the spot.
    fn start(&mut self, stage: Stage, scene: &mut Scene) -> Option<Active> {
        match stage {
            Stage::Delay(t) | Stage::Blank(t) => (t > 0.0).then_some(Active::Wait(t)),
            Stage::FadeOut { ids, duration } => {
                let ids: Vec<ElementId> = ids.into_iter().filter(|id| scene.is_visible(*id)).collect();
                if ids.is_empty() {
                    return None;
                }
                if duration <= 0.0 {
                    hide(scene, &ids);
                    return None;
                }
                self.anim_group(ids.into_iter().map(|id| ElementAnimation::fade_out(id, duration)))
            }
            Stage::FadeIn { ids, duration } => {
                if ids.is_empty() {
                    return None;
                }
                self.place(scene, &ids);
                if duration <= 0.0 {
                    self.reveal(scene, &ids);
                    return None;
                }
                for id in &ids {
                    if let Some(e) = scene.get_mut(*id) {
                        e.set_visible(true);
                        e.set_opacity(0.0);
                    }
                }
                let fades: Vec<ElementAnimation> = ids
                    .into_iter()
                    .map(|id| ElementAnimation::fade_in_to(id, self.shown_opacity(id), duration))
                    .collect();
                self.anim_group(fades)
            }
            Stage::ApplyMods => {
                apply_mods(scene, &self.target.element_mods);
                None
            }
            Stage::Place => {
                scene.set_element_transforms(&self.target.transforms);
                None
            }
            Stage::ShowTarget => {
                scene.show_only(&self.target.elements);
                None
            }
            Stage::Move { ids, duration } => {
                let moves: Vec<(ElementId, Transform, Transform)> = ids
                    .into_iter()
                    .filter_map(|id| {
                        let from = scene.get(id)?.transform();
                        let to = *self.target.transforms.get(&id)?;
                        (from != to).then_some((id, from, to))
                    })
                    .collect();
                if moves.is_empty() {
                    return None;
                }
                let duration = duration.unwrap_or_else(|| {
                    self.velocity
                        .max_move_time(moves.iter().map(|(_, from, to)| (from, to)))
                });
                if duration <= 0.0 {
                    for (id, _, to) in &moves {
                        if let Some(e) = scene.get_mut(*id) {
                            e.set_transform(*to);
                        }
                    }
                    return None;
                }
                let paths: Vec<MotionPath> = moves
                    .iter()
                    .map(|(id, _, _)| self.target.motion.get(id).copied().unwrap_or_default())
                    .collect();
                self.anim_group(moves.into_iter().zip(paths).map(|((id, from, to), path)| {
                    ElementAnimation::move_to(AnimTarget::Element(id), from, to, duration)
                        .with_path(path)
                }))
            }
            Stage::MoveCollection { from, to, duration } => {
                let duration = duration.unwrap_or_else(|| self.velocity.move_time(&from, &to));
                if duration <= 0.0 || from == to {
                    scene.set_transform(to);
                    return None;
                }
                scene.set_transform(from);
                self.anim_group([ElementAnimation::move_to(
                    AnimTarget::Collection,
                    from,
                    to,
                    duration,
                )])
            }
            Stage::Pulse(spec) => {
                if spec.duration <= 0.0 {
                    return None;
                }
                let base = match spec.target {
                    AnimTarget::Collection => scene.transform(),
                    AnimTarget::Element(id) => scene.get(id)?.transform(),
                };
                let group = self.scheduler.add_group([ElementAnimation::pulse(
                    spec.target,
                    base,
                    spec.centre,
                    spec.scale,
                    spec.duration,
                )]);
                Some(Active::Group(group))
            }
        }
    }

    /// Apply a stage's end state without animating
    fn settle(&mut self, stage: Stage, scene: &mut Scene) {
        match stage {
            Stage::Delay(_) | Stage::Blank(_) | Stage::Pulse(_) => {}
            Stage::FadeOut { ids, .. } => hide(scene, &ids),
            Stage::FadeIn { ids, .. } => {
                self.place(scene, &ids);
                self.reveal(scene, &ids);
            }
            Stage::ApplyMods => apply_mods(scene, &self.target.element_mods),
            Stage::Place => scene.set_element_transforms(&self.target.transforms),
            Stage::ShowTarget => scene.show_only(&self.target.elements),
            Stage::Move { ids, .. } => self.place(scene, &ids),
            Stage::MoveCollection { to, .. } => scene.set_transform(to),
        }
    }

    /// Opacity an element settles at once shown, honouring opacity patches
    fn shown_opacity(&self, id: ElementId) -> f32 {
        self.target
            .element_mods
            .get(&id)
            .and_then(|patch| patch.opacity)
            .unwrap_or(1.0)
    }

    fn reveal(&self, scene: &mut Scene, ids: &[ElementId]) {
        scene.show(ids);
        for id in ids {
            let opacity = self.shown_opacity(*id);
            if let Some(e) = scene.get_mut(*id) {
                e.set_opacity(opacity);
            }
        }
    }

    fn place(&self, scene: &mut Scene, ids: &[ElementId]) {
        for id in ids {
            if let (Some(t), Some(e)) = (self.target.transforms.get(id), scene.get_mut(*id)) {
                e.set_transform(*t);
            }
        }
    }
}

fn hide(scene: &mut Scene, ids: &[ElementId]) {
    for id in ids {
        if let Some(e) = scene.get_mut(*id) {
            e.set_visible(false);
            e.set_opacity(1.0);
        }
    }
}

fn build_plan(
    mode: MotionMode,
    t: &Timings,
    diff: &ElementDiff,
    shown: &[ElementId],
    target: &TransitionTarget,
    collection: Transform,
) -> VecDeque<Stage> {
    let fade_out = |ids: &[ElementId]| Stage::FadeOut {
        ids: ids.to_vec(),
        duration: t.fade_out,
    };
    let fade_in = |ids: &[ElementId]| Stage::FadeIn {
        ids: ids.to_vec(),
        duration: t.fade_in,
    };
    let move_kept = || Stage::Move {
        ids: diff.to_move.clone(),
        duration: t.move_duration,
    };

    let mut plan = vec![Stage::Delay(t.delay)];
    match mode {
        MotionMode::Move => plan.extend([
            fade_out(&diff.to_hide),
            Stage::ApplyMods,
            move_kept(),
            fade_in(&diff.to_show),
        ]),
        MotionMode::DissolveInThenMove => plan.extend([
            fade_out(&diff.to_hide),
            Stage::ApplyMods,
            fade_in(&diff.to_show),
            move_kept(),
        ]),
        MotionMode::MoveThenFade => plan.extend([
            Stage::ApplyMods,
            move_kept(),
            fade_out(&diff.to_hide),
            fade_in(&diff.to_show),
        ]),
        MotionMode::Dissolve | MotionMode::Pulse => {
            plan.extend([
                fade_out(shown),
                Stage::Place,
                Stage::ApplyMods,
                Stage::Blank(t.blank),
                fade_in(&target.elements),
            ]);
            if let (MotionMode::Pulse, Some(pulse)) = (mode, target.pulse) {
                plan.push(Stage::Pulse(pulse));
            }
        }
        MotionMode::MoveFrom => {
            let from = target.collection_from.unwrap_or(collection);
            plan.extend([
                fade_out(shown),
                Stage::Place,
                Stage::ApplyMods,
                Stage::MoveCollection {
                    from,
                    to: from,
                    duration: Some(0.0),
                },
                Stage::ShowTarget,
                Stage::MoveCollection {
                    from,
                    to: collection,
                    duration: t.move_duration,
                },
            ]);
        }
    }
    VecDeque::from(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqform_core::Element;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        scene: Scene,
        a: ElementId,
        b: ElementId,
        c: ElementId,
    }

    /// `a` and `b` shown; target shows `b` (moved) and `c`
    fn fixture() -> (Fixture, TransitionTarget) {
        let mut scene = Scene::new();
        let a = scene.insert(Element::text("a", "a"));
        let b = scene.insert(Element::text("b", "b"));
        let c = scene.insert(Element::text("c", "c"));
        scene.show(&[a, b]);

        let mut transforms = TransformMap::new();
        transforms.insert(b, Transform::from_translation(Point::new(0.35, 0.0)));
        transforms.insert(c, Transform::from_translation(Point::new(0.1, 0.0)));
        let target = TransitionTarget {
            form: "f2".to_string(),
            elements: vec![b, c],
            transforms,
            ..Default::default()
        };
        (Fixture { scene, a, b, c }, target)
    }

    fn recorder() -> (Rc<RefCell<Vec<TransitionOutcome>>>, Continuation) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, Box::new(move |o| sink.borrow_mut().push(o)))
    }

    fn run(controller: &mut TransitionController, scene: &mut Scene, seconds: f32) {
        let steps = (seconds / 0.01).round() as usize;
        for _ in 0..steps {
            controller.tick(0.01, scene);
        }
    }

    #[test]
    fn test_zero_timings_finish_synchronously() {
        let (mut f, target) = fixture();
        let (log, done) = recorder();
        let mut controller = TransitionController::default();
        let timings = Timings {
            delay: 0.0,
            fade_out: 0.0,
            move_duration: Some(0.0),
            blank: 0.0,
            fade_in: 0.0,
        };
        controller.begin(&mut f.scene, target, MotionMode::Move, timings, Some(done));

        assert!(!controller.is_animating());
        assert_eq!(*log.borrow(), vec![TransitionOutcome::Finished]);
        assert!(!f.scene.is_visible(f.a));
        assert!(f.scene.is_visible(f.b));
        assert!(f.scene.is_visible(f.c));
        assert_eq!(f.scene.get(f.b).unwrap().transform().translation.x, 0.35);
    }

    #[test]
    fn test_move_schedule_orders_stages() {
        let (mut f, target) = fixture();
        let (log, done) = recorder();
        let mut controller = TransitionController::new(VelocityLimits::default(), Easing::Linear);
        controller.begin(&mut f.scene, target, MotionMode::Move, Timings::default(), Some(done));

        let kinds: Vec<StageKind> = controller.schedule().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StageKind::Delay,
                StageKind::FadeOut,
                StageKind::ApplyMods,
                StageKind::Move,
                StageKind::FadeIn
            ]
        );
        assert_eq!(controller.diff().to_hide, vec![f.a]);
        assert_eq!(controller.diff().to_move, vec![f.b]);
        assert_eq!(controller.diff().to_show, vec![f.c]);

        // fade out runs first; b has not moved yet
        run(&mut controller, &mut f.scene, 0.2);
        assert!(f.scene.is_visible(f.a));
        assert_eq!(f.scene.get(f.b).unwrap().transform(), Transform::IDENTITY);

        // velocity move: 0.35 units at 0.35/s takes one second
        run(&mut controller, &mut f.scene, 0.7);
        assert!(!f.scene.is_visible(f.a));
        let bx = f.scene.get(f.b).unwrap().transform().translation.x;
        assert!(bx > 0.0 && bx < 0.35);
        assert!(!f.scene.is_visible(f.c));

        run(&mut controller, &mut f.scene, 0.6);
        assert!(f.scene.is_visible(f.c));
        assert!(log.borrow().is_empty());

        run(&mut controller, &mut f.scene, 0.4);
        assert!(!controller.is_animating());
        assert_eq!(*log.borrow(), vec![TransitionOutcome::Finished]);
        assert_eq!(f.scene.get(f.c).unwrap().opacity(), 1.0);
        assert_eq!(f.scene.get(f.b).unwrap().transform().translation.x, 0.35);
    }

    #[test]
    fn test_stop_complete_snaps_and_reports_cancelled() {
        let (mut f, target) = fixture();
        let (log, done) = recorder();
        let mut controller = TransitionController::default();
        controller.begin(&mut f.scene, target, MotionMode::Move, Timings::default(), Some(done));
        run(&mut controller, &mut f.scene, 0.1);

        controller.stop(StopMode::Complete, &mut f.scene);
        assert!(!controller.is_animating());
        assert_eq!(*log.borrow(), vec![TransitionOutcome::Cancelled]);
        assert!(!f.scene.is_visible(f.a));
        assert!(f.scene.is_visible(f.c));
        assert_eq!(f.scene.get(f.b).unwrap().transform().translation.x, 0.35);
    }

    #[test]
    fn test_stop_cancel_freezes_and_drops_continuation() {
        let (mut f, target) = fixture();
        let (log, done) = recorder();
        let mut controller = TransitionController::new(VelocityLimits::default(), Easing::Linear);
        controller.begin(&mut f.scene, target, MotionMode::Move, Timings::default(), Some(done));
        run(&mut controller, &mut f.scene, 0.2);

        controller.stop(StopMode::Cancel, &mut f.scene);
        assert!(!controller.is_animating());
        assert!(log.borrow().is_empty());
        let a = f.scene.get(f.a).unwrap();
        assert!(a.is_visible());
        assert!((a.opacity() - 0.5).abs() < 0.02);
        assert!(!f.scene.is_visible(f.c));
    }

    #[test]
    fn test_request_stop_applies_at_next_tick() {
        let (mut f, target) = fixture();
        let (log, done) = recorder();
        let mut controller = TransitionController::default();
        controller.begin(&mut f.scene, target, MotionMode::Move, Timings::default(), Some(done));

        controller.request_stop(StopMode::Complete);
        assert_eq!(controller.state(), TransitionState::CancelRequested(StopMode::Complete));
        assert!(log.borrow().is_empty());

        controller.tick(0.01, &mut f.scene);
        assert_eq!(controller.state(), TransitionState::Idle);
        assert_eq!(*log.borrow(), vec![TransitionOutcome::Cancelled]);
        assert!(f.scene.is_visible(f.c));
    }

    #[test]
    fn test_dissolve_fades_everything() {
        let (mut f, target) = fixture();
        let mut controller = TransitionController::new(VelocityLimits::default(), Easing::Linear);
        let timings = Timings {
            fade_out: 0.4,
            blank: 0.2,
            fade_in: 0.4,
            ..Default::default()
        };
        controller.begin(&mut f.scene, target, MotionMode::Dissolve, timings, None);
        assert_eq!(controller.planned(StageKind::FadeOut), Some(0.4));
        assert_eq!(controller.planned(StageKind::Blank), Some(0.2));
        assert_eq!(controller.planned(StageKind::FadeIn), Some(0.4));

        // b is kept by the target but still dissolves
        run(&mut controller, &mut f.scene, 0.2);
        assert!(f.scene.get(f.b).unwrap().opacity() < 1.0);

        run(&mut controller, &mut f.scene, 0.3);
        assert!(f.scene.shown_elements().is_empty());
        assert_eq!(f.scene.get(f.b).unwrap().transform().translation.x, 0.35);

        run(&mut controller, &mut f.scene, 0.55);
        assert!(!controller.is_animating());
        assert_eq!(f.scene.shown_elements(), vec![f.b, f.c]);
    }

    #[test]
    fn test_move_from_slides_collection_home() {
        let (mut f, mut target) = fixture();
        let start = Transform::from_translation(Point::new(-1.0, 0.0));
        target.collection_from = Some(start);
        let mut controller = TransitionController::default();
        let timings = Timings {
            fade_out: 0.2,
            move_duration: Some(1.0),
            ..Default::default()
        };
        controller.begin(&mut f.scene, target, MotionMode::MoveFrom, timings, None);

        run(&mut controller, &mut f.scene, 0.25);
        assert_eq!(f.scene.shown_elements(), vec![f.b, f.c]);
        assert!(f.scene.transform().translation.x < 0.0);

        run(&mut controller, &mut f.scene, 1.0);
        assert!(!controller.is_animating());
        assert_eq!(f.scene.transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_dissolve_in_then_move_fades_in_before_moving() {
        let (mut f, target) = fixture();
        let mut controller = TransitionController::new(VelocityLimits::default(), Easing::Linear);
        controller.begin(
            &mut f.scene,
            target,
            MotionMode::DissolveInThenMove,
            Timings::default(),
            None,
        );

        let kinds: Vec<StageKind> = controller.schedule().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StageKind::Delay,
                StageKind::FadeOut,
                StageKind::ApplyMods,
                StageKind::FadeIn,
                StageKind::Move
            ]
        );

        // c is fading in while b waits at its old place
        run(&mut controller, &mut f.scene, 0.5);
        assert!(!f.scene.is_visible(f.a));
        let c = f.scene.get(f.c).unwrap().opacity();
        assert!(f.scene.is_visible(f.c) && c > 0.0 && c < 1.0);
        assert_eq!(f.scene.get(f.b).unwrap().transform(), Transform::IDENTITY);

        run(&mut controller, &mut f.scene, 0.5);
        assert_eq!(f.scene.get(f.c).unwrap().opacity(), 1.0);
        let bx = f.scene.get(f.b).unwrap().transform().translation.x;
        assert!(bx > 0.0 && bx < 0.35);

        run(&mut controller, &mut f.scene, 1.0);
        assert!(!controller.is_animating());
        assert_eq!(f.scene.get(f.b).unwrap().transform().translation.x, 0.35);
    }

    #[test]
    fn test_move_then_fade_moves_before_fading() {
        let (mut f, target) = fixture();
        let mut controller = TransitionController::new(VelocityLimits::default(), Easing::Linear);
        controller.begin(&mut f.scene, target, MotionMode::MoveThenFade, Timings::default(), None);

        let kinds: Vec<StageKind> = controller.schedule().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StageKind::Delay,
                StageKind::ApplyMods,
                StageKind::Move,
                StageKind::FadeOut,
                StageKind::FadeIn
            ]
        );

        // b moves first; a stays fully shown and c stays hidden
        run(&mut controller, &mut f.scene, 0.5);
        let bx = f.scene.get(f.b).unwrap().transform().translation.x;
        assert!(bx > 0.0 && bx < 0.35);
        assert_eq!(f.scene.get(f.a).unwrap().opacity(), 1.0);
        assert!(!f.scene.is_visible(f.c));

        run(&mut controller, &mut f.scene, 0.7);
        assert_eq!(f.scene.get(f.b).unwrap().transform().translation.x, 0.35);
        let a = f.scene.get(f.a).unwrap();
        assert!(a.is_visible() && a.opacity() < 1.0);
        assert!(!f.scene.is_visible(f.c));

        run(&mut controller, &mut f.scene, 0.7);
        assert!(!controller.is_animating());
        assert!(!f.scene.is_visible(f.a));
        assert!(f.scene.is_visible(f.c));
    }

    #[test]
    fn test_fade_in_ends_at_patched_opacity() {
        let (mut f, mut target) = fixture();
        target.element_mods.insert(f.c, PropertyPatch::opacity(0.5));
        let mut controller = TransitionController::new(VelocityLimits::default(), Easing::Linear);
        controller.begin(&mut f.scene, target.clone(), MotionMode::Move, Timings::default(), None);

        // fade out 0.4, move 1.0, fade in 0.4
        run(&mut controller, &mut f.scene, 1.6);
        let c = f.scene.get(f.c).unwrap().opacity();
        assert!(c > 0.0 && c < 0.5);

        run(&mut controller, &mut f.scene, 0.4);
        assert!(!controller.is_animating());
        assert_eq!(f.scene.get(f.c).unwrap().opacity(), 0.5);

        // instant fade-in honours the patch too
        let (mut g, _) = fixture();
        let mut instant = target;
        instant.element_mods = IndexMap::from([(g.c, PropertyPatch::opacity(0.5))]);
        let timings = Timings {
            fade_out: 0.0,
            move_duration: Some(0.0),
            fade_in: 0.0,
            ..Default::default()
        };
        controller.begin(&mut g.scene, instant, MotionMode::Move, timings, None);
        assert!(!controller.is_animating());
        assert!(g.scene.is_visible(g.c));
        assert_eq!(g.scene.get(g.c).unwrap().opacity(), 0.5);
    }

    #[test]
    fn test_restart_modes_without_restart_data_dissolve() {
        let (mut f, target) = fixture();
        let mut controller = TransitionController::default();
        controller.begin(&mut f.scene, target.clone(), MotionMode::MoveFrom, Timings::default(), None);
        assert_eq!(controller.mode(), Some(MotionMode::Dissolve));
        assert_eq!(controller.planned(StageKind::MoveCollection), None);
        assert_eq!(controller.planned(StageKind::Blank), Some(0.2));

        controller.begin(&mut f.scene, target, MotionMode::Pulse, Timings::default(), None);
        assert_eq!(controller.mode(), Some(MotionMode::Dissolve));
        assert_eq!(controller.planned(StageKind::Pulse), None);
    }

    #[test]
    fn test_animate_to_transforms_uses_velocity() {
        let (mut f, _) = fixture();
        let mut controller = TransitionController::default();
        let mut transforms = TransformMap::new();
        transforms.insert(f.a, Transform::from_translation(Point::new(0.7, 0.0)));
        let d = controller.animate_to_transforms(&mut f.scene, &transforms, None, 0.0, None);
        assert!((d - 2.0).abs() < 1e-5);

        run(&mut controller, &mut f.scene, 2.05);
        assert!(!controller.is_animating());
        assert_eq!(f.scene.get(f.a).unwrap().transform().translation.x, 0.7);
    }
}
