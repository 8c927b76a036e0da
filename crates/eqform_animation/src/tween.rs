//! Timed animations of scene elements
//!
//! An [`ElementAnimation`] drives one property of one element (or of the
//! whole collection) from a start value to an end value over a fixed
//! duration, after an optional delay.

use eqform_core::{ElementId, Point, Scene, SceneCollection, SceneElement, Transform};

use crate::easing::Easing;
use crate::values::{Interpolate, MotionPath};

/// What an animation writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimTarget {
    Element(ElementId),
    /// The collection transform / opacity of the whole equation
    Collection,
}

/// Animated property and its endpoints
#[derive(Clone, Debug, PartialEq)]
pub enum Tween {
    /// Opacity ramp; `hide_on_finish` turns the element invisible (and
    /// restores full opacity) once the ramp reaches its end
    Opacity {
        from: f32,
        to: f32,
        hide_on_finish: bool,
    },
    Transform {
        from: Transform,
        to: Transform,
        path: MotionPath,
    },
    /// Scale about `centre` by `1 → scale → 1` on a half sine
    Pulse {
        base: Transform,
        centre: Point,
        scale: f32,
    },
}

/// Outcome of advancing an animation by one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepResult {
    Running,
    /// Finished this frame; `overshoot` is the unused part of the frame time
    Finished { overshoot: f32 },
}

#[derive(Clone, Debug)]
pub struct ElementAnimation {
    target: AnimTarget,
    tween: Tween,
    duration: f32,
    delay: f32,
    easing: Easing,
    elapsed: f32,
}

impl ElementAnimation {
    pub fn new(target: AnimTarget, tween: Tween, duration: f32) -> Self {
        Self {
            target,
            tween,
            duration: duration.max(0.0),
            delay: 0.0,
            easing: Easing::default(),
            elapsed: 0.0,
        }
    }

    /// Fade an element from transparent to its full opacity
    pub fn fade_in(id: ElementId, duration: f32) -> Self {
        Self::fade_in_to(id, 1.0, duration)
    }

    /// Fade an element from transparent to `opacity`
    pub fn fade_in_to(id: ElementId, opacity: f32, duration: f32) -> Self {
        Self::new(
            AnimTarget::Element(id),
            Tween::Opacity {
                from: 0.0,
                to: opacity,
                hide_on_finish: false,
            },
            duration,
        )
    }

    /// Fade an element out and hide it at the end
    pub fn fade_out(id: ElementId, duration: f32) -> Self {
        Self::new(
            AnimTarget::Element(id),
            Tween::Opacity {
                from: 1.0,
                to: 0.0,
                hide_on_finish: true,
            },
            duration,
        )
    }

    pub fn move_to(target: AnimTarget, from: Transform, to: Transform, duration: f32) -> Self {
        Self::new(
            target,
            Tween::Transform {
                from,
                to,
                path: MotionPath::Linear,
            },
            duration,
        )
    }

    pub fn pulse(target: AnimTarget, base: Transform, centre: Point, scale: f32, duration: f32) -> Self {
        Self::new(
            target,
            Tween::Pulse {
                base,
                centre,
                scale,
            },
            duration,
        )
        .with_easing(Easing::Linear)
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Route a transform tween along `path`; ignored by other tweens
    pub fn with_path(mut self, path: MotionPath) -> Self {
        if let Tween::Transform { path: p, .. } = &mut self.tween {
            *p = path;
        }
        self
    }

    pub fn target(&self) -> AnimTarget {
        self.target
    }

    pub fn tween(&self) -> &Tween {
        &self.tween
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Delay plus duration
    pub fn total_time(&self) -> f32 {
        self.delay + self.duration
    }

    /// Advance by `dt` seconds and write the interpolated value
    pub fn step(&mut self, dt: f32, scene: &mut Scene) -> StepResult {
        self.elapsed += dt.max(0.0);
        if self.elapsed < self.delay {
            return StepResult::Running;
        }
        let local = self.elapsed - self.delay;
        if local >= self.duration {
            self.finish(scene);
            return StepResult::Finished {
                overshoot: local - self.duration,
            };
        }
        let progress = self.easing.apply(local / self.duration);
        self.apply(scene, progress);
        StepResult::Running
    }

    /// Jump to the end state
    pub fn finish(&mut self, scene: &mut Scene) {
        self.elapsed = self.total_time();
        self.apply(scene, 1.0);
        if let Tween::Opacity {
            hide_on_finish: true,
            ..
        } = self.tween
        {
            match self.target {
                AnimTarget::Element(id) => {
                    if let Some(e) = scene.get_mut(id) {
                        e.set_visible(false);
                        e.set_opacity(1.0);
                    }
                }
                AnimTarget::Collection => {
                    scene.hide_all();
                    scene.set_opacity(1.0);
                }
            }
        }
    }

    fn apply(&self, scene: &mut Scene, progress: f32) {
        match (&self.tween, self.target) {
            (Tween::Opacity { from, to, .. }, AnimTarget::Element(id)) => {
                if let Some(e) = scene.get_mut(id) {
                    e.set_visible(true);
                    e.set_opacity(from.lerp(to, progress));
                }
            }
            (Tween::Opacity { from, to, .. }, AnimTarget::Collection) => {
                scene.set_opacity(from.lerp(to, progress));
            }
            (Tween::Transform { from, to, path }, target) => {
                let t = path.interpolate(from, to, progress);
                write_transform(scene, target, t);
            }
            (
                Tween::Pulse {
                    base,
                    centre,
                    scale,
                },
                target,
            ) => {
                let k = 1.0 + (scale - 1.0) * (std::f32::consts::PI * progress).sin();
                let k = if progress >= 1.0 { 1.0 } else { k };
                let t = Transform::new(
                    *centre + (base.translation - *centre) * k,
                    base.scale * k,
                    base.rotation,
                );
                write_transform(scene, target, t);
            }
        }
    }
}

fn write_transform(scene: &mut Scene, target: AnimTarget, t: Transform) {
    match target {
        AnimTarget::Element(id) => {
            if let Some(e) = scene.get_mut(id) {
                e.set_transform(t);
            }
        }
        AnimTarget::Collection => scene.set_transform(t),
    }
}
