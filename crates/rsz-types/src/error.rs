use thiserror::Error;

use crate::kind::FieldKind;

/// Errors produced by schema lookups and typed field access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("class {class} has no field named {field}")]
    UnknownField { class: String, field: String },

    #[error("field {class}.{field} expects {expected}")]
    KindMismatch {
        class: String,
        field: String,
        expected: String,
    },

    #[error("instance of {class} has {actual} values, schema declares {expected}")]
    FieldCount {
        class: String,
        expected: usize,
        actual: usize,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TypeError {
    pub(crate) fn kind_mismatch(class: &str, field: &str, kind: FieldKind, array: bool) -> Self {
        let expected = if array {
            format!("an array of {kind}")
        } else {
            kind.to_string()
        };
        TypeError::KindMismatch {
            class: class.to_string(),
            field: field.to_string(),
            expected,
        }
    }
}

/// Convenience alias for type-level results.
pub type TypeResult<T> = Result<T, TypeError>;
