//! Typed errors for source adapter calls.

use std::fmt;
use thiserror::Error;

use crate::types::SourceKind;

/// The four primary operations every adapter may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Discover,
    FetchEntity,
    FetchContent,
    FetchPricing,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Discover => "discover",
            Capability::FetchEntity => "fetch_entity",
            Capability::FetchContent => "fetch_content",
            Capability::FetchPricing => "fetch_pricing",
        })
    }
}

/// Errors a single adapter call can produce. None of these abort a run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network, timeout, or parse failure at the source
    #[error("{kind} unavailable: {reason}")]
    Unavailable { kind: SourceKind, reason: String },

    /// Adapter is registered but this capability is stubbed
    #[error("{kind} does not support {capability}")]
    NotSupported {
        kind: SourceKind,
        capability: Capability,
    },

    /// Identifier does not exist at the source
    #[error("{kind} has no entity {source_id}")]
    NotFound { kind: SourceKind, source_id: String },
}

impl SourceError {
    pub fn unavailable(kind: SourceKind, reason: impl fmt::Display) -> Self {
        SourceError::Unavailable {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn not_supported(kind: SourceKind, capability: Capability) -> Self {
        SourceError::NotSupported { kind, capability }
    }

    pub fn not_found(kind: SourceKind, source_id: impl Into<String>) -> Self {
        SourceError::NotFound {
            kind,
            source_id: source_id.into(),
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, SourceError::NotSupported { .. })
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceError::Unavailable { kind, .. }
            | SourceError::NotSupported { kind, .. }
            | SourceError::NotFound { kind, .. } => *kind,
        }
    }
}

/// A platform name that is not one of the known source kinds.
#[derive(Debug, Error)]
#[error("unknown source kind: {0}")]
pub struct UnknownSourceKind(pub String);

/// Result type alias for adapter calls.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
