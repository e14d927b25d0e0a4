use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("no resource type configured for {0}")]
    UnmappedFile(String),

    #[error("file not open: {0}")]
    FileNotOpen(String),

    #[error("invalid resource key '{0}' in bundle diff")]
    InvalidResourceKey(String),

    #[error("malformed bundle: {0}")]
    MalformedBundle(String),

    #[error("invalid editor config: {0}")]
    Config(String),

    #[error("session state poisoned")]
    Poisoned,

    #[error("handler error: {0}")]
    Handler(#[from] rsz_handlers::HandlerError),

    #[error("ledger error: {0}")]
    Ledger(#[from] rsz_ledger::LedgerError),

    #[error("diff error: {0}")]
    Diff(#[from] rsz_diff::DiffError),

    #[error("schema error: {0}")]
    Schema(#[from] rsz_types::TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
