// Test doubles for the resolution pipeline.
//
// MockAdapter implements SourceAdapter from in-memory maps. Anything not
// registered behaves like a real source would: discovery without records is
// NotSupported, an unknown id is NotFound, a marked id is Unavailable.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use prospector_common::{
    Capability, ContentItem, PricingTier, SourceAdapter, SourceError, SourceKind, SourceRecord,
    SourceResult,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Minimal record: kind, id and display name, everything else default.
pub fn record(kind: SourceKind, source_id: &str, name: &str) -> SourceRecord {
    SourceRecord::builder()
        .kind(kind)
        .source_id(source_id)
        .name(name)
        .build()
}

// ---------------------------------------------------------------------------
// InFlight
// ---------------------------------------------------------------------------

/// Counts concurrent calls across every adapter sharing it and remembers
/// the highest count seen.
#[derive(Debug, Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }
}

struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// MockAdapter
// ---------------------------------------------------------------------------

/// Map-backed source adapter.
/// Builder pattern: `.on_discover()`, `.on_entity()`, `.on_content()`, `.on_pricing()`.
pub struct MockAdapter {
    kind: SourceKind,
    discover: Option<Vec<SourceRecord>>,
    discover_fails: bool,
    discover_delay: Option<Duration>,
    fetch_supported: bool,
    fetch_delay: Option<Duration>,
    in_flight: Option<Arc<InFlight>>,
    entities: HashMap<String, SourceRecord>,
    unavailable: HashSet<String>,
    content: HashMap<String, Vec<ContentItem>>,
    pricing: HashMap<String, Vec<PricingTier>>,
    fetched: Mutex<Vec<String>>,
}

impl MockAdapter {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            discover: None,
            discover_fails: false,
            discover_delay: None,
            fetch_supported: true,
            fetch_delay: None,
            in_flight: None,
            entities: HashMap::new(),
            unavailable: HashSet::new(),
            content: HashMap::new(),
            pricing: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn on_discover(mut self, records: Vec<SourceRecord>) -> Self {
        self.discover = Some(records);
        self
    }

    /// Discovery fails with `Unavailable`.
    pub fn failing_discover(mut self) -> Self {
        self.discover_fails = true;
        self
    }

    /// Sleep before answering discovery, for cancellation tests.
    pub fn with_discover_delay(mut self, delay: Duration) -> Self {
        self.discover_delay = Some(delay);
        self
    }

    /// Sleep inside `fetch_entity`, so overlapping fetches are observable.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Report `discover` and `fetch_entity` calls to a shared counter.
    pub fn tracked_by(mut self, in_flight: Arc<InFlight>) -> Self {
        self.in_flight = Some(in_flight);
        self
    }

    pub fn on_entity(mut self, record: SourceRecord) -> Self {
        self.entities.insert(record.source_id.clone(), record);
        self
    }

    /// `fetch_entity` for this id fails with `Unavailable`.
    pub fn unavailable(mut self, source_id: &str) -> Self {
        self.unavailable.insert(source_id.to_string());
        self
    }

    /// `fetch_entity` is stubbed and returns `NotSupported`.
    pub fn without_fetch(mut self) -> Self {
        self.fetch_supported = false;
        self
    }

    pub fn on_content(mut self, source_id: &str, items: Vec<ContentItem>) -> Self {
        self.content.insert(source_id.to_string(), items);
        self
    }

    pub fn on_pricing(mut self, source_id: &str, tiers: Vec<PricingTier>) -> Self {
        self.pricing.insert(source_id.to_string(), tiers);
        self
    }

    /// Ids passed to `fetch_entity`, in call order.
    pub fn fetched_ids(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn discover(
        &self,
        _search_terms: &[String],
        max_results: usize,
    ) -> SourceResult<Vec<SourceRecord>> {
        let _guard = self.in_flight.as_deref().map(InFlight::enter);
        if let Some(delay) = self.discover_delay {
            tokio::time::sleep(delay).await;
        }
        if self.discover_fails {
            return Err(SourceError::unavailable(self.kind, "MockAdapter: discovery down"));
        }
        match &self.discover {
            Some(records) => Ok(records.iter().take(max_results).cloned().collect()),
            None => Err(SourceError::not_supported(self.kind, Capability::Discover)),
        }
    }

    async fn fetch_entity(&self, source_id: &str) -> SourceResult<SourceRecord> {
        if !self.fetch_supported {
            return Err(SourceError::not_supported(self.kind, Capability::FetchEntity));
        }
        self.fetched.lock().unwrap().push(source_id.to_string());
        let _guard = self.in_flight.as_deref().map(InFlight::enter);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        if self.unavailable.contains(source_id) {
            return Err(SourceError::unavailable(
                self.kind,
                format!("MockAdapter: {source_id} unreachable"),
            ));
        }
        self.entities
            .get(source_id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(self.kind, source_id))
    }

    async fn fetch_content(
        &self,
        source_id: &str,
        max_items: usize,
    ) -> SourceResult<Vec<ContentItem>> {
        Ok(self
            .content
            .get(source_id)
            .map(|items| items.iter().take(max_items).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_pricing(&self, source_id: &str) -> SourceResult<Vec<PricingTier>> {
        Ok(self.pricing.get(source_id).cloned().unwrap_or_default())
    }
}
