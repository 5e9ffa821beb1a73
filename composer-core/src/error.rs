//! Error types for composer operations.

use thiserror::Error;

/// Result type for composer operations.
pub type ComposerResult<T> = Result<T, ComposerError>;

/// Errors that can occur in composer operations.
///
/// Layout and compilation are total; these errors only surface at the
/// document boundary (reading module JSON, looking up activities by id).
#[derive(Debug, Error)]
pub enum ComposerError {
    /// Activity not found in module.
    #[error("Activity not found: {0}")]
    ActivityNotFound(String),

    /// Module serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
