//! Identity resolution: fold source records one at a time into a growing
//! arena of canonical entities.
//!
//! Matching runs in a fixed order and the first hit wins:
//! 1. exact email (case-insensitive)
//! 2. exact website (scheme-normalized) against every record of an entity
//! 3. fuzzy primary-name similarity at or above the configured threshold
//!
//! Exact signals come first so two people with similar display names stay
//! apart when either carries independent exact evidence. There is no scoring
//! across rules.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use prospector_common::{extract, RecordKey, ResolverConfig, SourceAdapter, SourceRecord};

use crate::entity::CanonicalEntity;
use crate::matching::{
    effective_email, name_similarity, normalize_email, normalize_name, normalize_website,
};

/// Which rule merged a record into an existing entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MatchRule {
    Email,
    Website,
    FuzzyName { ratio: f64 },
    /// The exact same `(kind, source_id)` is already held by this entity.
    SameRecord,
}

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Merged { index: usize, rule: MatchRule },
    Created { index: usize },
}

impl Resolution {
    /// Arena index of the entity the record ended up in.
    pub fn index(&self) -> usize {
        match self {
            Resolution::Merged { index, .. } | Resolution::Created { index } => *index,
        }
    }
}

/// Counters for one resolver's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveStats {
    pub records: u32,
    pub created: u32,
    pub merged_by_email: u32,
    pub merged_by_website: u32,
    pub merged_by_name: u32,
    pub merged_same_record: u32,
    /// Exact-rule hits against more than one entity (first one won).
    pub ambiguous_matches: u32,
}

impl fmt::Display for ResolveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records resolved:   {}", self.records)?;
        writeln!(f, "Entities created:   {}", self.created)?;
        writeln!(f, "Merged by email:    {}", self.merged_by_email)?;
        writeln!(f, "Merged by website:  {}", self.merged_by_website)?;
        writeln!(f, "Merged by name:     {}", self.merged_by_name)?;
        writeln!(f, "Repeated records:   {}", self.merged_same_record)?;
        writeln!(f, "Ambiguous matches:  {}", self.ambiguous_matches)
    }
}

struct Candidate {
    index: usize,
    rule: MatchRule,
    /// Other entities the same exact rule would also have matched.
    also_matched: Vec<usize>,
}

/// Deterministic, single-writer owner of the entity arena for one run.
#[derive(Debug)]
pub struct IdentityResolver {
    threshold: f64,
    entities: Vec<CanonicalEntity>,
    claimed: HashSet<RecordKey>,
    stats: ResolveStats,
}

impl IdentityResolver {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            entities: Vec::new(),
            claimed: HashSet::new(),
            stats: ResolveStats::default(),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.name_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve a record, falling back to the default biography scan when
    /// the record carries no email of its own.
    pub fn resolve(&mut self, record: SourceRecord) -> Resolution {
        let extracted = extract::first_email(&record.bio);
        self.resolve_with_email(record, extracted)
    }

    /// Resolve a record using the producing adapter's email extraction.
    pub fn resolve_from(&mut self, adapter: &dyn SourceAdapter, record: SourceRecord) -> Resolution {
        let extracted = adapter.extract_email(&record);
        self.resolve_with_email(record, extracted)
    }

    /// Resolve a record whose email, if absent, may be backfilled by
    /// `extracted_email`.
    pub fn resolve_with_email(
        &mut self,
        record: SourceRecord,
        extracted_email: Option<String>,
    ) -> Resolution {
        self.stats.records += 1;
        let email = effective_email(record.email.clone(), extracted_email);

        // A record already held by an entity always goes back to it.
        let owner = self.owner_of(&record.key());
        let found = match (self.find_match(&record, email.as_deref()), owner) {
            (Some(candidate), Some(owner)) if candidate.index != owner => {
                Some(Candidate::same_record(owner))
            }
            (None, Some(owner)) => Some(Candidate::same_record(owner)),
            (found, _) => found,
        };

        match found {
            Some(candidate) => {
                if !candidate.also_matched.is_empty() {
                    self.stats.ambiguous_matches += 1;
                    warn!(
                        record = %record.key(),
                        chosen = candidate.index,
                        also_matched = ?candidate.also_matched,
                        rule = ?candidate.rule,
                        "Ambiguous exact match, merging into first entity"
                    );
                }
                match candidate.rule {
                    MatchRule::Email => self.stats.merged_by_email += 1,
                    MatchRule::Website => self.stats.merged_by_website += 1,
                    MatchRule::FuzzyName { .. } => self.stats.merged_by_name += 1,
                    MatchRule::SameRecord => self.stats.merged_same_record += 1,
                }
                debug!(
                    record = %record.key(),
                    entity = candidate.index,
                    rule = ?candidate.rule,
                    "Merged record into existing entity"
                );
                self.merge_into(candidate.index, record, email);
                Resolution::Merged {
                    index: candidate.index,
                    rule: candidate.rule,
                }
            }
            None => {
                let index = self.entities.len();
                self.stats.created += 1;
                debug!(record = %record.key(), entity = index, "Created new entity");
                self.claimed.insert(record.key());
                self.entities.push(CanonicalEntity::new(record, email));
                Resolution::Created { index }
            }
        }
    }

    /// Append `record` to a specific entity without list-wide matching.
    /// Used by enrichment, where the cross-source reference is the evidence.
    /// `email` is the record's effective email; a blank one is dropped.
    pub(crate) fn merge_into(&mut self, index: usize, record: SourceRecord, email: Option<String>) {
        self.claimed.insert(record.key());
        self.entities[index].absorb(record, effective_email(email, None));
    }

    /// Whether any entity already holds a record with this key.
    pub fn is_claimed(&self, key: &RecordKey) -> bool {
        self.claimed.contains(key)
    }

    pub fn entities(&self) -> &[CanonicalEntity] {
        &self.entities
    }

    pub(crate) fn entity_mut(&mut self, index: usize) -> &mut CanonicalEntity {
        &mut self.entities[index]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    pub fn into_entities(self) -> Vec<CanonicalEntity> {
        self.entities
    }

    fn find_match(&self, record: &SourceRecord, email: Option<&str>) -> Option<Candidate> {
        if let Some(email) = email {
            let wanted = normalize_email(email);
            let hits = self.matching_indices(|entity| {
                entity.email().map(normalize_email).as_deref() == Some(wanted.as_str())
            });
            if let Some(candidate) = Candidate::from_hits(hits, MatchRule::Email) {
                return Some(candidate);
            }
        }

        if let Some(wanted) = record.website.as_deref().and_then(normalize_website) {
            let hits = self.matching_indices(|entity| {
                entity
                    .websites()
                    .filter_map(normalize_website)
                    .any(|site| site == wanted)
            });
            if let Some(candidate) = Candidate::from_hits(hits, MatchRule::Website) {
                return Some(candidate);
            }
        }

        self.best_name_match(record)
    }

    fn owner_of(&self, key: &RecordKey) -> Option<usize> {
        if !self.claimed.contains(key) {
            return None;
        }
        self.entities.iter().position(|entity| entity.contains(key))
    }

    fn best_name_match(&self, record: &SourceRecord) -> Option<Candidate> {
        let name = normalize_name(&record.name);
        if name.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, entity) in self.entities.iter().enumerate() {
            let ratio = name_similarity(&name, &normalize_name(entity.name()));
            if best.map_or(true, |(_, top)| ratio > top) {
                best = Some((index, ratio));
            }
        }

        best.filter(|(_, ratio)| *ratio >= self.threshold)
            .map(|(index, ratio)| Candidate {
                index,
                rule: MatchRule::FuzzyName { ratio },
                also_matched: Vec::new(),
            })
    }

    fn matching_indices(&self, predicate: impl Fn(&CanonicalEntity) -> bool) -> Vec<usize> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| predicate(entity))
            .map(|(index, _)| index)
            .collect()
    }
}

impl Candidate {
    fn same_record(index: usize) -> Self {
        Self {
            index,
            rule: MatchRule::SameRecord,
            also_matched: Vec::new(),
        }
    }

    fn from_hits(hits: Vec<usize>, rule: MatchRule) -> Option<Self> {
        let (&index, rest) = hits.split_first()?;
        Some(Self {
            index,
            rule,
            also_matched: rest.to_vec(),
        })
    }
}
