//! Renderer error types.
//!
//! Compilation itself is total and never fails; these errors only cover
//! reading module documents from JSON.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur around compilation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The module document could not be read.
    #[error("Invalid module document: {0}")]
    Module(#[from] composer_core::ComposerError),

    /// Course settings could not be read.
    #[error("Invalid course settings: {0}")]
    Settings(#[from] serde_json::Error),
}
