//! Error types for eqform

use eqform_layout::LayoutError;
use thiserror::Error;

/// Errors surfaced by the equation API
///
/// Unknown element, form and series names are not errors; they are skipped
/// or ignored with a log line.
#[derive(Error, Debug)]
pub enum EquationError {
    /// A form could not be laid out (invalid scale or transform)
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    /// Configuration could not be parsed
    #[error("Config parse failed: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("Config read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for EquationError {
    fn from(err: toml::de::Error) -> Self {
        EquationError::Config(err.to_string())
    }
}

/// Result type alias for equation operations
pub type Result<T> = std::result::Result<T, EquationError>;
