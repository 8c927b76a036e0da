//! Error types for eqform_layout

use eqform_core::CoreError;
use thiserror::Error;

/// Layout error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid layout scale: {0}")]
    InvalidScale(f32),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
