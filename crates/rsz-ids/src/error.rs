use rsz_types::{FieldKind, TypeError};
use thiserror::Error;

/// Errors produced while building an ID generator or computing an ID.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The resource type declares no ID fields.
    #[error("no ID fields declared for class {class}")]
    NoIdFields { class: String },

    /// An ID field has a kind that cannot be turned into an ID.
    #[error("field {class}.{field} of kind {kind} cannot be used as an ID field")]
    UnsupportedFieldKind {
        class: String,
        field: String,
        kind: FieldKind,
    },

    /// The instance is not of the class the generator was built for.
    #[error("ID generator for {expected} applied to an instance of {actual}")]
    ClassMismatch { expected: String, actual: String },

    /// The instance does not hold the expected value for an ID field.
    #[error("field {class}.{field} does not hold a {kind} value")]
    UnexpectedValue {
        class: String,
        field: String,
        kind: FieldKind,
    },

    /// Schema lookup failed.
    #[error("schema error: {0}")]
    Schema(#[from] TypeError),
}

/// Convenience alias for ID results.
pub type IdResult<T> = Result<T, IdError>;
