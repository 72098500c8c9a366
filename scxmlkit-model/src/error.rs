//! Model error types.

use thiserror::Error;

/// Errors from the builder/mutation API.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid initial '{id}' for '{owner}': not a direct child")]
    InvalidInitial { owner: String, id: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ModelError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns an error code suitable for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ModelError::NotFound { .. } => "NOT_FOUND",
            ModelError::InvalidInitial { .. } => "INVALID_INITIAL",
            ModelError::Json(_) => "BAD_JSON",
        }
    }
}

/// A dangling or illegal identifier reference found by
/// [`Document::validate`](crate::Document::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("document initial '{id}' is not a top-level state")]
    InitialNotTopLevel { id: String },

    #[error("initial '{id}' of state '{state}' does not resolve")]
    DanglingInitial { state: String, id: String },

    #[error("atomic state '{state}' must not declare an initial")]
    InitialOnAtomic { state: String },

    #[error("transition target '{target}' in '{source_id}' does not resolve")]
    DanglingTarget { source_id: String, target: String },

    #[error("duplicate id '{id}'")]
    DuplicateId { id: String },
}
