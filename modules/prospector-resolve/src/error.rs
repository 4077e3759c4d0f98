use prospector_common::{SourceError, SourceKind};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid discovery request: {0}")]
    InvalidInput(String),

    #[error("No adapter registered for {0}")]
    NoAdapter(SourceKind),

    #[error("Discovery run cancelled")]
    Cancelled,

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
