//! Equation configuration
//!
//! Defaults for layout and transition timing. Every field has a default so a
//! config file only needs to name what it changes:
//!
//! ```toml
//! scale = 1.5
//!
//! [timing]
//! fade_out = 0.3
//!
//! [restart.pulse]
//! scale = 1.2
//! ```

use eqform_animation::{Easing, VelocityLimits};
use eqform_core::Point;
use eqform_layout::Alignment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Top-level configuration of an equation instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquationConfig {
    /// Layout scale used when a form does not set one
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub dissolve_split: DissolveSplit,
    #[serde(default)]
    pub velocity: VelocityLimits,
    #[serde(default)]
    pub restart: RestartPolicy,
    #[serde(default)]
    pub easing: Easing,
}

fn default_scale() -> f32 {
    1.0
}

impl Default for EquationConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            alignment: Alignment::default(),
            timing: TimingConfig::default(),
            dissolve_split: DissolveSplit::default(),
            velocity: VelocityLimits::default(),
            restart: RestartPolicy::default(),
            easing: Easing::default(),
        }
    }
}

impl EquationConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Stage durations used when a transition does not give its own
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub fade_out: f32,
    pub blank: f32,
    pub fade_in: f32,
    /// Delay before the forward animation of a replay
    pub replay_delay: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_out: 0.4,
            blank: 0.2,
            fade_in: 0.4,
            replay_delay: 0.5,
        }
    }
}

/// Fractions of a dissolve's total duration spent in each stage
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissolveSplit {
    pub fade_out: f32,
    pub blank: f32,
    pub fade_in: f32,
}

impl Default for DissolveSplit {
    fn default() -> Self {
        Self {
            fade_out: 0.4,
            blank: 0.2,
            fade_in: 0.4,
        }
    }
}

/// Scale pulse played after a restart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub scale: f32,
    pub duration: f32,
    /// Element to pulse; the whole equation when unset
    pub element: Option<String>,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            scale: 1.1,
            duration: 1.0,
            element: None,
        }
    }
}

/// What happens when `next_form` wraps from the last form to the first
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartPolicy {
    /// Replay the first form by moving the equation in from this position
    pub move_from: Option<Point>,
    /// Dissolve in, then pulse
    pub pulse: Option<PulseConfig>,
}

impl RestartPolicy {
    /// Dissolve into the first form (the default)
    pub fn dissolve() -> Self {
        Self::default()
    }

    pub fn move_from(point: Point) -> Self {
        Self {
            move_from: Some(point),
            pulse: None,
        }
    }

    pub fn pulse(pulse: PulseConfig) -> Self {
        Self {
            move_from: None,
            pulse: Some(pulse),
        }
    }
}
