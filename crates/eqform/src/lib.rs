//! eqform
//!
//! Equations as sets of named forms. Each form lays the same elements out
//! differently; moving between forms fades out what leaves, moves what stays
//! and fades in what arrives.
//!
//! # Example
//!
//! ```rust
//! use eqform::{Equation, EquationConfig, FormOptions, GoToForm};
//! use eqform_core::Element;
//! use eqform_layout::FixedAdvanceMetrics;
//!
//! let mut eq = Equation::with_metrics(EquationConfig::default(), FixedAdvanceMetrics::new(0.04));
//! for name in ["a", "+", "b", "=", "c"] {
//!     eq.add_element(Element::text(name, name));
//! }
//! eq.add_form("sum", vec!["a", "+", "b", "=", "c"], FormOptions::new()).unwrap();
//! eq.add_form("swap", vec!["b", "+", "a", "=", "c"], FormOptions::new()).unwrap();
//!
//! eq.show_form("sum");
//! eq.go_to_form(GoToForm::name("swap").with_duration(1.0));
//! while eq.tick(1.0 / 60.0) {}
//! assert_eq!(eq.current_form_name(), Some("swap"));
//! ```
//!
//! Time only advances through [`Equation::tick`]; nothing runs in the
//! background.

pub mod config;
pub mod equation;
pub mod error;
pub mod form;
pub mod navigator;
pub mod reconcile;
pub mod transition;

pub use config::{DissolveSplit, EquationConfig, PulseConfig, RestartPolicy, TimingConfig};
pub use equation::{Equation, FormTarget, GoToForm, IfAnimating};
pub use error::{EquationError, Result};
pub use form::{
    AnimationOverride, Form, FormAnchor, FormHook, FormOptions, FromWhere, OverrideOptions, PropertyPatch,
};
pub use navigator::{restart_mode, FormNavigator, NavStep, DEFAULT_SERIES};
pub use reconcile::{diff, ElementDiff};
pub use transition::{
    Continuation, MotionMode, PlannedStage, PulseSpec, StageKind, StopMode, Timings,
    TransitionController, TransitionOutcome, TransitionState, TransitionTarget,
};

pub use eqform_animation::{CurveDirection, Easing, MotionPath, VelocityLimits};
pub use eqform_layout::{Alignment, Phrase, XAlign, YAlign};
