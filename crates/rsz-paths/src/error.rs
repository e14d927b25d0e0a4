use thiserror::Error;

/// Errors produced while parsing object paths.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("object path must not be empty")]
    Empty,

    #[error("object path {path:?} contains an empty segment")]
    EmptySegment { path: String },

    #[error("invalid occurrence in segment {segment:?}: occurrences start at 1")]
    InvalidOccurrence { segment: String },
}

/// Convenience alias for path results.
pub type PathResult<T> = Result<T, PathError>;
