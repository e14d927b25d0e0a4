//! Error types for the diff crate.

use rsz_paths::PathError;
use rsz_types::TypeError;

/// Errors that can occur while converting, diffing or applying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiffError {
    /// A class lookup or typed access failed.
    #[error("schema error: {0}")]
    Schema(#[from] TypeError),

    /// The diff names a field the live instance's class does not have.
    #[error("diff references missing field {class}.{field}")]
    MissingField { class: String, field: String },

    /// A `_data` diff targets a game object without a data instance.
    #[error("missing game object data instance on {name}")]
    MissingGameObjectData { name: String },

    /// A tree node does not have the shape the field kind requires.
    #[error("type mismatch at {field}: expected {expected}")]
    TypeMismatch { field: String, expected: String },

    /// A scene diff path does not resolve on the live hierarchy.
    #[error("diff target no longer exists: {0}")]
    UnresolvedPath(String),

    /// A scene diff key is not a valid object path.
    #[error("invalid object path: {0}")]
    InvalidPath(#[from] PathError),

    /// The diff document itself is not shaped like a diff.
    #[error("malformed diff: {0}")]
    MalformedDiff(String),
}

impl DiffError {
    pub(crate) fn mismatch(field: &str, expected: impl Into<String>) -> Self {
        DiffError::TypeMismatch {
            field: field.to_string(),
            expected: expected.into(),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
