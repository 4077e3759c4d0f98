//! A full discovery run: query sources, resolve, enrich, rank.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use prospector_common::{
    DiscoveryConfig, FileConfig, ResolverConfig, SourceAdapter, SourceKind, SourceRecord,
    SourceResult,
};

use crate::enrichment::{soft, EnrichmentStats, EnrichmentWalker};
use crate::entity::CanonicalEntity;
use crate::error::{ResolveError, Result};
use crate::ranking::rank;
use crate::registry::SourceRegistry;
use crate::resolver::{IdentityResolver, ResolveStats};

/// What to look for and where.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRequest {
    pub search_terms: Vec<String>,
    /// `None` targets every registered source.
    pub sources: Option<Vec<SourceKind>>,
    /// `None` uses the configured default.
    pub max_results_per_source: Option<usize>,
}

impl DiscoveryRequest {
    pub fn new<I, S>(search_terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_terms: search_terms.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceKind>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results_per_source = Some(max_results);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Records returned per source, before cross-source dedup.
    pub discovered: BTreeMap<SourceKind, usize>,
    pub failed_sources: Vec<SourceKind>,
    pub duplicate_records: u32,
    pub resolve: ResolveStats,
    pub enrichment: EnrichmentStats,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            discovered: BTreeMap::new(),
            failed_sources: Vec::new(),
            duplicate_records: 0,
            resolve: ResolveStats::default(),
            enrichment: EnrichmentStats::default(),
        }
    }
}

/// Ranked entities plus the run's bookkeeping.
#[derive(Debug, Serialize)]
pub struct DiscoveryOutcome {
    pub entities: Vec<CanonicalEntity>,
    pub report: RunReport,
}

struct RunPlan {
    terms: Vec<String>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    max_results: usize,
}

/// Entry point for discovery and single-profile scraping.
pub struct Prospector {
    registry: SourceRegistry,
    resolver: ResolverConfig,
    discovery: DiscoveryConfig,
}

impl Prospector {
    pub fn new(registry: SourceRegistry, config: &FileConfig) -> Self {
        Self {
            registry,
            resolver: config.resolver.clone(),
            discovery: config.discovery.clone(),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub async fn discover(&self, request: DiscoveryRequest) -> Result<DiscoveryOutcome> {
        self.discover_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run discovery until done or until `cancel` fires. A cancelled run
    /// returns `Cancelled` and drops every partially built entity.
    pub async fn discover_with_cancel(
        &self,
        request: DiscoveryRequest,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryOutcome> {
        let plan = self.plan(request)?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Discovery run cancelled, discarding partial results");
                Err(ResolveError::Cancelled)
            }
            outcome = self.run(plan) => Ok(outcome),
        }
    }

    fn plan(&self, request: DiscoveryRequest) -> Result<RunPlan> {
        if self.registry.is_empty() {
            return Err(ResolveError::InvalidInput(
                "no source adapters registered".into(),
            ));
        }

        let terms: Vec<String> = request
            .search_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        if terms.is_empty() {
            return Err(ResolveError::InvalidInput(
                "at least one non-blank search term is required".into(),
            ));
        }

        let max_results = request
            .max_results_per_source
            .unwrap_or(self.discovery.max_results_per_source);
        if max_results == 0 {
            return Err(ResolveError::InvalidInput(
                "max results per source must be at least 1".into(),
            ));
        }

        let adapters = self.registry.select(request.sources.as_deref());
        if adapters.is_empty() {
            return Err(ResolveError::InvalidInput(format!(
                "none of the requested sources are registered (registered: {:?})",
                self.registry
            )));
        }

        Ok(RunPlan {
            terms,
            adapters,
            max_results,
        })
    }

    async fn run(&self, plan: RunPlan) -> DiscoveryOutcome {
        let run_id = Uuid::new_v4();
        let mut report = RunReport::new(run_id);
        info!(
            %run_id,
            terms = plan.terms.len(),
            sources = plan.adapters.len(),
            "Starting discovery run"
        );

        let terms = plan.terms.as_slice();
        let max_results = plan.max_results;
        let batches: Vec<(Arc<dyn SourceAdapter>, SourceResult<Vec<SourceRecord>>)> =
            stream::iter(plan.adapters)
                .map(|adapter| async move {
                    let result = adapter.discover(terms, max_results).await;
                    (adapter, result)
                })
                .buffered(self.discovery.max_concurrent_sources.max(1))
                .collect()
                .await;

        // Sequential from here on: one writer for the entity arena.
        let mut resolver = IdentityResolver::from_config(&self.resolver);
        let mut seen = HashSet::new();

        for (adapter, result) in batches {
            let kind = adapter.kind();
            match result {
                Ok(records) => {
                    info!(source = adapter.name(), count = records.len(), "Source discovery complete");
                    report.discovered.insert(kind, records.len());
                    for record in records {
                        if !seen.insert(record.key()) {
                            report.duplicate_records += 1;
                            debug!(record = %record.key(), "Duplicate record in discovery batch");
                            continue;
                        }
                        resolver.resolve_from(adapter.as_ref(), record);
                    }
                }
                Err(err) if err.is_not_supported() => {
                    debug!(source = adapter.name(), "Source does not support discovery");
                }
                Err(err) => {
                    warn!(source = adapter.name(), error = %err, "Source discovery failed, continuing");
                    report.failed_sources.push(kind);
                }
            }
        }

        let walker = EnrichmentWalker::new(&self.registry, &self.discovery);
        report.enrichment = walker.enrich_all(&mut resolver).await;
        report.resolve = resolver.stats().clone();

        let mut entities = resolver.into_entities();
        rank(&mut entities);

        info!(%run_id, entities = entities.len(), "Discovery run complete");
        info!("{}", report.resolve);

        DiscoveryOutcome { entities, report }
    }

    /// Fetch one profile with its content and pricing, then enrich it.
    pub async fn scrape_single(&self, kind: SourceKind, source_id: &str) -> Result<CanonicalEntity> {
        let adapter = self
            .registry
            .get(kind)
            .ok_or(ResolveError::NoAdapter(kind))?;

        let record = adapter.fetch_entity(source_id).await?;
        let content = soft(
            adapter
                .fetch_content(&record.source_id, self.discovery.max_content_items)
                .await,
            &record,
            "content",
        );
        let pricing = soft(adapter.fetch_pricing(&record.source_id).await, &record, "pricing");

        let mut resolver = IdentityResolver::from_config(&self.resolver);
        let index = resolver.resolve_from(adapter.as_ref(), record).index();
        {
            let entity = resolver.entity_mut(index);
            entity.attach_content(content);
            entity.attach_pricing(pricing);
        }

        let walker = EnrichmentWalker::new(&self.registry, &self.discovery);
        let mut stats = EnrichmentStats::default();
        walker.enrich(&mut resolver, index, &mut stats).await;
        debug!(%kind, source_id, merged = stats.merged, "Single profile enriched");

        let mut entities = resolver.into_entities();
        Ok(entities.swap_remove(index))
    }
}
