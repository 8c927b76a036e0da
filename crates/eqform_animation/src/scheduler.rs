//! Animation scheduler
//!
//! Owns every in-flight [`ElementAnimation`] of one equation and advances
//! them from the frame tick. Animations started together can be registered
//! as a group; a group is a counting join that reports completion once its
//! slowest member has finished.

use eqform_core::Scene;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::tween::{ElementAnimation, StepResult};

new_key_type! {
    /// Handle to a registered animation
    pub struct AnimationId;
    /// Handle to a group of animations that complete together
    pub struct GroupId;
}

/// Completion notice for a group, returned from [`AnimationScheduler::tick`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupFinished {
    pub group: GroupId,
    /// Frame time left over after the last member finished
    pub overshoot: f32,
}

#[derive(Debug)]
struct Scheduled {
    animation: ElementAnimation,
    group: Option<GroupId>,
}

#[derive(Debug)]
struct Group {
    remaining: usize,
    overshoot: f32,
}

/// Frame-driven scheduler for element animations
#[derive(Debug, Default)]
pub struct AnimationScheduler {
    animations: SlotMap<AnimationId, Scheduled>,
    groups: SlotMap<GroupId, Group>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a standalone animation
    pub fn add(&mut self, animation: ElementAnimation) -> AnimationId {
        self.animations.insert(Scheduled {
            animation,
            group: None,
        })
    }

    /// Register animations that complete as one unit. An empty group
    /// completes on the next tick.
    pub fn add_group<I>(&mut self, animations: I) -> GroupId
    where
        I: IntoIterator<Item = ElementAnimation>,
    {
        let group = self.groups.insert(Group {
            remaining: 0,
            overshoot: f32::INFINITY,
        });
        let mut count = 0;
        for animation in animations {
            self.animations.insert(Scheduled {
                animation,
                group: Some(group),
            });
            count += 1;
        }
        if let Some(g) = self.groups.get_mut(group) {
            g.remaining = count;
        }
        tracing::trace!("animation group {:?} registered with {} members", group, count);
        group
    }

    /// Advance every animation by `dt` seconds.
    ///
    /// Returns the groups whose last member finished during this frame.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> SmallVec<[GroupFinished; 2]> {
        // Overshoot only counts members finishing in this frame
        for g in self.groups.values_mut() {
            g.overshoot = f32::INFINITY;
        }

        let groups = &mut self.groups;
        self.animations.retain(|_, scheduled| {
            match scheduled.animation.step(dt, scene) {
                StepResult::Running => true,
                StepResult::Finished { overshoot } => {
                    if let Some(g) = scheduled.group.and_then(|id| groups.get_mut(id)) {
                        g.remaining = g.remaining.saturating_sub(1);
                        g.overshoot = g.overshoot.min(overshoot);
                    }
                    false
                }
            }
        });

        let mut finished = SmallVec::new();
        self.groups.retain(|group, g| {
            if g.remaining == 0 {
                let overshoot = if g.overshoot.is_finite() { g.overshoot } else { dt };
                finished.push(GroupFinished { group, overshoot });
                false
            } else {
                true
            }
        });
        finished
    }

    /// Snap every animation to its end state and clear the scheduler
    pub fn finish_all(&mut self, scene: &mut Scene) {
        for scheduled in self.animations.values_mut() {
            scheduled.animation.finish(scene);
        }
        self.animations.clear();
        self.groups.clear();
    }

    /// Drop every animation, leaving elements at their current values
    pub fn cancel_all(&mut self) {
        self.animations.clear();
        self.groups.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.animations.is_empty() || !self.groups.is_empty()
    }

    pub fn is_group_active(&self, group: GroupId) -> bool {
        self.groups.contains_key(group)
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

}
