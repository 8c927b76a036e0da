//! eqform Animation
//!
//! Frame-driven animation for equation elements:
//!
//! - **Tweens**: fades, moves along linear or curved paths, color changes and pulses
//! - **Scheduler**: owns in-flight animations and reports group completion from `tick`
//! - **Velocity model**: move durations derived from per-component velocity caps
//!
//! Nothing here runs on its own thread; progress only happens when the
//! owner calls [`AnimationScheduler::tick`].

pub mod easing;
pub mod scheduler;
pub mod tween;
pub mod values;
pub mod velocity;

pub use easing::Easing;
pub use scheduler::{AnimationId, AnimationScheduler, GroupFinished, GroupId};
pub use tween::{AnimTarget, ElementAnimation, StepResult, Tween};
pub use values::{CurveDirection, Interpolate, MotionPath};
pub use velocity::VelocityLimits;
