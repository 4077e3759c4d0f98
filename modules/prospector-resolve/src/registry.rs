use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use prospector_common::{SourceAdapter, SourceKind};

/// The adapters available to a run, keyed by source kind.
///
/// Iteration follows `SourceKind` declaration order, so repeated runs visit
/// sources in the same sequence.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: BTreeMap<SourceKind, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own kind, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn with(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn get(&self, kind: SourceKind) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = SourceKind> + '_ {
        self.adapters.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Adapters to query: all of them, or only the requested kinds that are
    /// registered. Unregistered kinds are dropped silently.
    pub fn select(&self, kinds: Option<&[SourceKind]>) -> Vec<Arc<dyn SourceAdapter>> {
        self.adapters
            .iter()
            .filter(|(kind, _)| kinds.map_or(true, |wanted| wanted.contains(kind)))
            .map(|(_, adapter)| Arc::clone(adapter))
            .collect()
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.adapters.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAdapter;

    #[test]
    fn select_respects_filter_and_kind_order() {
        let registry = SourceRegistry::new()
            .with(Arc::new(MockAdapter::new(SourceKind::Patreon)))
            .with(Arc::new(MockAdapter::new(SourceKind::YouTube)))
            .with(Arc::new(MockAdapter::new(SourceKind::Skool)));

        let all: Vec<_> = registry.select(None).iter().map(|a| a.kind()).collect();
        assert_eq!(
            all,
            vec![SourceKind::YouTube, SourceKind::Skool, SourceKind::Patreon]
        );

        let some: Vec<_> = registry
            .select(Some(&[SourceKind::Patreon, SourceKind::TikTok]))
            .iter()
            .map(|a| a.kind())
            .collect();
        assert_eq!(some, vec![SourceKind::Patreon]);
    }

    #[test]
    fn register_replaces_same_kind() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(MockAdapter::new(SourceKind::YouTube)));
        registry.register(Arc::new(MockAdapter::new(SourceKind::YouTube)));
        assert_eq!(registry.len(), 1);
    }
}
