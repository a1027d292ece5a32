//! Crate error type.
//!
//! Validation findings are never errors: they are returned as diagnostics in a
//! `ValidationResult`. `Error` covers the operations around validation that
//! can genuinely fail (decoding input, the publish gate).

use crate::parse::types::WorkflowStatus;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The workflow JSON could not be decoded.
    #[error("failed to parse workflow JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The validator configuration JSON could not be decoded.
    #[error("failed to parse validator config: {0}")]
    Config(#[source] serde_json::Error),

    /// Validation produced errors, so the workflow may not be published.
    #[error("workflow '{workflow_id}' has {error_count} validation error(s) and cannot be published")]
    NotPublishable {
        workflow_id: String,
        error_count: usize,
    },

    /// Only drafts can be published.
    #[error("workflow '{workflow_id}' cannot be published from status '{from}'")]
    InvalidTransition {
        workflow_id: String,
        from: WorkflowStatus,
    },
}

impl Error {
    /// Stable short code, mirrored by the editor when rendering failures.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Parse(_) => "P001",
            Error::Config(_) => "P002",
            Error::NotPublishable { .. } => "G001",
            Error::InvalidTransition { .. } => "G002",
        }
    }
}
