//! Error types for the ledger crate.

/// Errors that can occur while editing or persisting a bundle.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No listing entry exists under this local key.
    #[error("no resource listed under '{0}'")]
    UnknownResource(String),

    /// Reading or writing the bundle file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bundle file is not valid bundle JSON.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience alias for ledger results.
pub type LedgerResult<T> = Result<T, LedgerError>;
