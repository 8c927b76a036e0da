//! Error types for eqform_core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite transform: {0}")]
    NonFiniteTransform(String),

    #[error("Unknown element: {0}")]
    UnknownElement(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
