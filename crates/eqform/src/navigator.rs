//! Form series navigation
//!
//! Tracks the current form and the ordered series that `next`/`prev` walk
//! through. Forms added without an explicit series go into the default
//! series in insertion order.

use indexmap::IndexMap;

use crate::config::RestartPolicy;
use crate::transition::MotionMode;

/// Name of the series that collects forms in insertion order
pub const DEFAULT_SERIES: &str = "base";

/// Result of a navigation query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavStep {
    pub name: String,
    pub index: usize,
    /// The step wrapped around an end of the series
    pub wrapped: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FormNavigator {
    series: IndexMap<String, Vec<String>>,
    active: Option<String>,
    current: Option<String>,
}

impl FormNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly added form to the default series
    pub fn register_form(&mut self, name: &str) {
        let series = self.series.entry(DEFAULT_SERIES.to_string()).or_default();
        if !series.iter().any(|n| n == name) {
            series.push(name.to_string());
        }
        if self.active.is_none() {
            self.active = Some(DEFAULT_SERIES.to_string());
        }
    }

    /// Register a named series. A custom series replaces the default one as
    /// the active series the first time one is added.
    pub fn add_series<I, S>(&mut self, name: &str, forms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let forms: Vec<String> = forms.into_iter().map(Into::into).collect();
        let first_custom = !self.series.keys().any(|k| k != DEFAULT_SERIES);
        self.series.insert(name.to_string(), forms);
        if first_custom || self.active.is_none() {
            self.active = Some(name.to_string());
        }
    }

    /// Returns `false` when no series has that name
    pub fn set_active_series(&mut self, name: &str) -> bool {
        if self.series.contains_key(name) {
            self.active = Some(name.to_string());
            true
        } else {
            tracing::warn!("no form series named '{}'", name);
            false
        }
    }

    pub fn active_series_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_series(&self) -> &[String] {
        self.active
            .as_ref()
            .and_then(|name| self.series.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn series(&self, name: &str) -> Option<&[String]> {
        self.series.get(name).map(Vec::as_slice)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn set_current(&mut self, name: impl Into<String>) {
        self.current = Some(name.into());
    }

    /// Position of the current form in the active series
    pub fn index_of_current(&self) -> Option<usize> {
        let current = self.current.as_deref()?;
        self.active_series().iter().position(|n| n == current)
    }

    /// Form at `index` of the active series
    pub fn at(&self, index: usize) -> Option<&str> {
        self.active_series().get(index).map(String::as_str)
    }

    /// Step forward, wrapping from the last form to the first. With no
    /// current form the first form is next. Returns `None` on an empty
    /// series or when the current form is not part of it.
    pub fn next_step(&self) -> Option<NavStep> {
        let series = self.active_series();
        if series.is_empty() {
            return None;
        }
        let (index, wrapped) = match self.current {
            None => (0, false),
            Some(_) => {
                let i = self.index_of_current()?;
                if i + 1 >= series.len() {
                    (0, true)
                } else {
                    (i + 1, false)
                }
            }
        };
        Some(NavStep {
            name: series[index].clone(),
            index,
            wrapped,
        })
    }

    /// Step backward, wrapping from the first form to the last
    pub fn prev_step(&self) -> Option<NavStep> {
        let series = self.active_series();
        if series.is_empty() {
            return None;
        }
        let last = series.len() - 1;
        let (index, wrapped) = match self.current {
            None => (last, false),
            Some(_) => match self.index_of_current()? {
                0 => (last, true),
                i => (i - 1, false),
            },
        };
        Some(NavStep {
            name: series[index].clone(),
            index,
            wrapped,
        })
    }
}

/// Mode used when `next` wraps back to the first form
pub fn restart_mode(policy: &RestartPolicy) -> MotionMode {
    if policy.move_from.is_some() {
        MotionMode::MoveFrom
    } else if policy.pulse.is_some() {
        MotionMode::Pulse
    } else {
        MotionMode::Dissolve
    }
}
