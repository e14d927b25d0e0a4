use rsz_diff::DiffError;
use rsz_ids::IdError;
use rsz_types::TypeError;

/// Errors raised while configuring handlers or moving resources in and out
/// of base files.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    /// No handler is registered under this discriminator.
    #[error("unknown resource handler: {0}")]
    UnknownHandler(String),

    /// A required key is absent from a handler configuration.
    #[error("handler '{handler}' config is missing required field '{field}'")]
    MissingConfigField { handler: String, field: String },

    /// A configuration key is present but unusable.
    #[error("handler '{handler}' config is invalid: {message}")]
    InvalidConfig { handler: String, message: String },

    /// The handler does not implement the requested operation.
    #[error("handler '{handler}' does not support {operation}")]
    Unsupported { handler: String, operation: String },

    /// The base file is not in the format the handler reads.
    #[error("handler '{handler}' expects a {expected} file, got {actual}")]
    WrongFormat {
        handler: String,
        expected: String,
        actual: String,
    },

    /// The base file lacks the instance the handler starts from.
    #[error("handler '{handler}': {message}")]
    MissingRoot { handler: String, message: String },

    /// A resource body does not match what the handler writes back.
    #[error("resource {id} has shape {actual}, handler '{handler}' writes {expected}")]
    ResourceShape {
        handler: String,
        id: i64,
        expected: String,
        actual: String,
    },

    /// A freshly created entry cannot carry the requested ID.
    #[error("cannot write id {id} into {class}")]
    IdNotAssignable { class: String, id: i64 },

    #[error("id error: {0}")]
    Id(#[from] IdError),

    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("schema error: {0}")]
    Schema(#[from] TypeError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl HandlerError {
    pub(crate) fn missing_field(handler: &str, field: &str) -> Self {
        Self::MissingConfigField {
            handler: handler.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(handler: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            handler: handler.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience alias for handler results.
pub type HandlerResult<T> = Result<T, HandlerError>;
