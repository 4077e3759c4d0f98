use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Capability, SourceError, SourceResult};
use crate::extract;
use crate::types::{ContentItem, PricingTier, SourceKind, SourceRecord};

/// Capability set every source implementation provides.
///
/// The four primary operations default to `NotSupported`, so a stub adapter
/// only has to name its kind. Callers can then tell "no adapter registered"
/// (a registry miss) apart from "adapter registered, capability stubbed".
///
/// Retry and backoff, if any, live inside the adapter.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The source this adapter talks to.
    fn kind(&self) -> SourceKind;

    /// Best-effort listing of profiles matching any of `search_terms`.
    /// May return fewer than `max_results`.
    async fn discover(
        &self,
        _search_terms: &[String],
        _max_results: usize,
    ) -> SourceResult<Vec<SourceRecord>> {
        Err(SourceError::not_supported(self.kind(), Capability::Discover))
    }

    /// Full-detail profile for one identifier.
    async fn fetch_entity(&self, _source_id: &str) -> SourceResult<SourceRecord> {
        Err(SourceError::not_supported(self.kind(), Capability::FetchEntity))
    }

    /// Recent content (videos, posts, courses) for one identifier.
    async fn fetch_content(
        &self,
        _source_id: &str,
        _max_items: usize,
    ) -> SourceResult<Vec<ContentItem>> {
        Err(SourceError::not_supported(self.kind(), Capability::FetchContent))
    }

    /// Pricing tiers for one identifier.
    async fn fetch_pricing(&self, _source_id: &str) -> SourceResult<Vec<PricingTier>> {
        Err(SourceError::not_supported(self.kind(), Capability::FetchPricing))
    }

    /// Find a contact email in the record's biography.
    fn extract_email(&self, record: &SourceRecord) -> Option<String> {
        extract::first_email(&record.bio)
    }

    /// Find social profile references in free text.
    fn extract_social_references(&self, text: &str) -> BTreeMap<String, String> {
        extract::social_references(text)
    }

    /// Niche tags for a profile description.
    fn extract_niche_tags(&self, text: &str) -> BTreeSet<String> {
        extract::niche_tags(text)
    }

    /// Adapter name for logging.
    fn name(&self) -> &str {
        self.kind().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAdapter;

    #[async_trait]
    impl SourceAdapter for StubAdapter {
        fn kind(&self) -> SourceKind {
            SourceKind::Patreon
        }
    }

    #[tokio::test]
    async fn unimplemented_operations_fail_with_not_supported() {
        let adapter = StubAdapter;

        let err = adapter.discover(&["yoga".to_string()], 10).await.unwrap_err();
        assert!(err.is_not_supported());
        assert_eq!(err.kind(), SourceKind::Patreon);

        let err = adapter.fetch_entity("janefit").await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::NotSupported {
                capability: Capability::FetchEntity,
                ..
            }
        ));

        assert!(adapter.fetch_content("janefit", 5).await.unwrap_err().is_not_supported());
        assert!(adapter.fetch_pricing("janefit").await.unwrap_err().is_not_supported());
    }

    #[test]
    fn default_email_extraction_reads_bio() {
        let record = SourceRecord::builder()
            .kind(SourceKind::Patreon)
            .source_id("janefit")
            .name("Jane Fit")
            .bio("Business: hello@janefit.com")
            .build();

        assert_eq!(
            StubAdapter.extract_email(&record).as_deref(),
            Some("hello@janefit.com")
        );
        assert_eq!(StubAdapter.name(), "patreon");
    }
}
