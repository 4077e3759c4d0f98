//! One-hop enrichment: follow each entity's social references into
//! registered adapters and merge what comes back.
//!
//! Fetches for one entity run concurrently (bounded); merges back into the
//! resolver happen sequentially afterwards.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use prospector_common::extract::source_id_from_reference;
use prospector_common::{
    ContentItem, DiscoveryConfig, PricingTier, RecordKey, SourceAdapter, SourceError,
    SourceKind, SourceRecord, SourceResult,
};

use crate::matching::effective_email;
use crate::registry::SourceRegistry;
use crate::resolver::IdentityResolver;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentStats {
    pub references_seen: u32,
    pub fetched: u32,
    pub merged: u32,
    /// Platform has no registered adapter (or is not a source kind at all).
    pub skipped_unregistered: u32,
    /// Reference could not be reduced to a source identifier.
    pub skipped_unparseable: u32,
    /// Target record already belongs to an entity in this run.
    pub skipped_claimed: u32,
    pub not_supported: u32,
    pub failed: u32,
}

impl fmt::Display for EnrichmentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "References seen:    {}", self.references_seen)?;
        writeln!(f, "Profiles fetched:   {}", self.fetched)?;
        writeln!(f, "Profiles merged:    {}", self.merged)?;
        writeln!(f, "Skipped (no src):   {}", self.skipped_unregistered)?;
        writeln!(f, "Skipped (bad ref):  {}", self.skipped_unparseable)?;
        writeln!(f, "Skipped (claimed):  {}", self.skipped_claimed)?;
        writeln!(f, "Not supported:      {}", self.not_supported)?;
        writeln!(f, "Failed:             {}", self.failed)
    }
}

struct FetchJob {
    adapter: Arc<dyn SourceAdapter>,
    reference: String,
    source_id: String,
}

struct Fetched {
    record: SourceRecord,
    email: Option<String>,
    content: Vec<ContentItem>,
    pricing: Vec<PricingTier>,
}

pub struct EnrichmentWalker<'a> {
    registry: &'a SourceRegistry,
    max_concurrent_fetches: usize,
    max_content_items: usize,
}

impl<'a> EnrichmentWalker<'a> {
    pub fn new(registry: &'a SourceRegistry, config: &DiscoveryConfig) -> Self {
        Self {
            registry,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            max_content_items: config.max_content_items,
        }
    }

    /// Enrich every entity currently in the resolver, in arena order.
    pub async fn enrich_all(&self, resolver: &mut IdentityResolver) -> EnrichmentStats {
        let mut stats = EnrichmentStats::default();
        for index in 0..resolver.len() {
            self.enrich(resolver, index, &mut stats).await;
        }
        info!(
            fetched = stats.fetched,
            merged = stats.merged,
            failed = stats.failed,
            "Enrichment complete"
        );
        stats
    }

    /// Follow the references the entity holds right now. Anything merged
    /// here may add references, but those are not visited.
    pub(crate) async fn enrich(
        &self,
        resolver: &mut IdentityResolver,
        index: usize,
        stats: &mut EnrichmentStats,
    ) {
        let jobs = self.plan(resolver, index, stats);
        if jobs.is_empty() {
            return;
        }

        let max_items = self.max_content_items;
        let results: Vec<(FetchJob, SourceResult<Fetched>)> = stream::iter(jobs)
            .map(|job| async move {
                let result = fetch_one(&job, max_items).await;
                (job, result)
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        for (job, result) in results {
            match result {
                Ok(fetched) => {
                    stats.fetched += 1;
                    let key = fetched.record.key();
                    if resolver.is_claimed(&key) {
                        stats.skipped_claimed += 1;
                        debug!(record = %key, "Fetched record already resolved, skipping");
                        continue;
                    }
                    debug!(record = %key, entity = index, "Merging enriched record");
                    resolver.merge_into(index, fetched.record, fetched.email);
                    let entity = resolver.entity_mut(index);
                    entity.attach_content(fetched.content);
                    entity.attach_pricing(fetched.pricing);
                    stats.merged += 1;
                }
                Err(SourceError::NotSupported { kind, capability }) => {
                    stats.not_supported += 1;
                    debug!(%kind, %capability, reference = job.reference, "Enrichment not supported");
                }
                Err(err @ SourceError::NotFound { .. }) => {
                    stats.failed += 1;
                    info!(reference = job.reference, error = %err, "Referenced profile not found");
                }
                Err(err) => {
                    stats.failed += 1;
                    warn!(
                        source = job.adapter.name(),
                        reference = job.reference,
                        error = %err,
                        "Enrichment fetch failed"
                    );
                }
            }
        }
    }

    fn plan(
        &self,
        resolver: &IdentityResolver,
        index: usize,
        stats: &mut EnrichmentStats,
    ) -> Vec<FetchJob> {
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();

        // BTreeMap: platforms are visited in name order.
        for (platform, reference) in resolver.entities()[index].social() {
            stats.references_seen += 1;

            let Some(adapter) = SourceKind::from_platform_name(platform)
                .and_then(|kind| self.registry.get(kind))
            else {
                stats.skipped_unregistered += 1;
                debug!(platform, reference, "No adapter for referenced platform");
                continue;
            };

            let Some(source_id) = source_id_from_reference(reference) else {
                stats.skipped_unparseable += 1;
                debug!(platform, reference, "Could not extract source id from reference");
                continue;
            };

            let key = RecordKey::new(adapter.kind(), source_id.clone());
            if resolver.is_claimed(&key) || !seen.insert(key) {
                stats.skipped_claimed += 1;
                continue;
            }

            jobs.push(FetchJob {
                adapter: Arc::clone(adapter),
                reference: reference.clone(),
                source_id,
            });
        }

        jobs
    }
}

async fn fetch_one(job: &FetchJob, max_items: usize) -> SourceResult<Fetched> {
    let adapter = job.adapter.as_ref();
    let record = adapter.fetch_entity(&job.source_id).await?;

    let content = soft(
        adapter.fetch_content(&record.source_id, max_items).await,
        &record,
        "content",
    );
    let pricing = soft(
        adapter.fetch_pricing(&record.source_id).await,
        &record,
        "pricing",
    );
    let email = effective_email(record.email.clone(), adapter.extract_email(&record));

    Ok(Fetched {
        record,
        email,
        content,
        pricing,
    })
}

/// Auxiliary fetches never block the profile merge.
pub(crate) fn soft<T>(result: SourceResult<Vec<T>>, record: &SourceRecord, what: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) if err.is_not_supported() => Vec::new(),
        Err(err) => {
            warn!(record = %record.key(), what, error = %err, "Auxiliary fetch failed");
            Vec::new()
        }
    }
}
