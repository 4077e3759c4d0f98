use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use prospector_common::{ContentItem, PricingTier, RecordKey, SourceRecord};

/// One resolved identity, built from every source record that matched it.
///
/// The primary record is fixed at creation. Later records are only ever
/// appended, and resolved fields are backfilled, never overwritten.
#[derive(Debug, Clone)]
pub struct CanonicalEntity {
    primary: SourceRecord,
    secondaries: Vec<SourceRecord>,
    email: Option<String>,
    website: Option<String>,
    social: BTreeMap<String, String>,
    tags: BTreeSet<String>,
    palette: Vec<String>,
    content: Vec<ContentItem>,
    pricing: Vec<PricingTier>,
}

impl CanonicalEntity {
    /// Start a new entity. `email` is the record's effective email: its own
    /// field, or one extracted from its biography.
    pub(crate) fn new(primary: SourceRecord, email: Option<String>) -> Self {
        Self {
            email,
            website: primary.website.clone(),
            social: primary.social.clone(),
            tags: primary.tags.clone(),
            palette: primary.palette.clone(),
            primary,
            secondaries: Vec::new(),
            content: Vec::new(),
            pricing: Vec::new(),
        }
    }

    /// Merge a matched record: union tags and social references (existing
    /// keys win), backfill email, website and palette only while unset.
    pub(crate) fn absorb(&mut self, record: SourceRecord, email: Option<String>) {
        self.tags.extend(record.tags.iter().cloned());

        for (platform, reference) in &record.social {
            self.social
                .entry(platform.clone())
                .or_insert_with(|| reference.clone());
        }

        if self.email.is_none() {
            self.email = email;
        }
        if self.website.is_none() {
            self.website = record.website.clone();
        }
        if self.palette.is_empty() && !record.palette.is_empty() {
            self.palette = record.palette.clone();
        }

        self.secondaries.push(record);
    }

    pub(crate) fn attach_content(&mut self, items: Vec<ContentItem>) {
        self.content.extend(items);
    }

    pub(crate) fn attach_pricing(&mut self, tiers: Vec<PricingTier>) {
        self.pricing.extend(tiers);
    }

    pub fn primary(&self) -> &SourceRecord {
        &self.primary
    }

    pub fn secondaries(&self) -> &[SourceRecord] {
        &self.secondaries
    }

    /// Primary first, then secondaries in merge order.
    pub fn records(&self) -> impl Iterator<Item = &SourceRecord> {
        std::iter::once(&self.primary).chain(self.secondaries.iter())
    }

    pub fn record_count(&self) -> usize {
        1 + self.secondaries.len()
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records()
            .any(|r| r.kind == key.kind && r.source_id == key.source_id)
    }

    pub fn name(&self) -> &str {
        &self.primary.name
    }

    /// Longest biography across all records; the primary's wins ties.
    pub fn bio(&self) -> &str {
        self.records()
            .map(|r| r.bio.as_str())
            .fold(self.primary.bio.as_str(), |best, bio| {
                if bio.chars().count() > best.chars().count() {
                    bio
                } else {
                    best
                }
            })
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    /// Every website reported by any record, in merge order.
    pub fn websites(&self) -> impl Iterator<Item = &str> {
        self.records().filter_map(|r| r.website.as_deref())
    }

    pub fn social(&self) -> &BTreeMap<String, String> {
        &self.social
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Summed follower, subscriber and member counts across every record.
    pub fn audience_size(&self) -> u64 {
        self.records()
            .map(SourceRecord::audience_total)
            .fold(0u64, u64::saturating_add)
    }

    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    pub fn pricing(&self) -> &[PricingTier] {
        &self.pricing
    }

    /// Split the display name at the first whitespace run into first/last.
    pub fn name_parts(&self) -> (Option<&str>, Option<&str>) {
        let trimmed = self.primary.name.trim();
        if trimmed.is_empty() {
            return (None, None);
        }
        match trimmed.split_once(char::is_whitespace) {
            Some((first, rest)) => (Some(first), Some(rest.trim_start())),
            None => (Some(trimmed), None),
        }
    }
}

impl Serialize for CanonicalEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (first_name, last_name) = self.name_parts();
        let records: Vec<&SourceRecord> = self.records().collect();

        let mut state = serializer.serialize_struct("CanonicalEntity", 14)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("first_name", &first_name)?;
        state.serialize_field("last_name", &last_name)?;
        state.serialize_field("bio", self.bio())?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("website", &self.website)?;
        state.serialize_field("social", &self.social)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("audience_size", &self.audience_size())?;
        state.serialize_field("palette", &self.palette)?;
        state.serialize_field("primary", &self.primary.key())?;
        state.serialize_field("records", &records)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("pricing", &self.pricing)?;
        state.end()
    }
}
