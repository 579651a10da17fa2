//! Error types for quire-core.

use thiserror::Error;

/// Errors raised by classification and its input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The diff provider reported a status the classifier does not model.
    #[error("unsupported change status '{status}' for {path}")]
    UnsupportedStatus { path: String, status: String },

    /// The configured target folder is not a single path segment.
    #[error("invalid target folder '{value}': {reason}")]
    InvalidTargetFolder { value: String, reason: &'static str },
}
