use async_trait::async_trait;

use prospector_common::{SourceAdapter, SourceKind};

/// A registered source with no capabilities yet. Every primary operation
/// answers `NotSupported`, so enrichment skips its references quietly while
/// the registry still knows the kind exists.
#[derive(Debug, Clone, Copy)]
pub struct StubAdapter {
    kind: SourceKind,
}

impl StubAdapter {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn kind(&self) -> SourceKind {
        self.kind
    }
}
