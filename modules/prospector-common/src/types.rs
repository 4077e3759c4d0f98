use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use typed_builder::TypedBuilder;

use crate::error::UnknownSourceKind;

/// External platforms a coach profile can be discovered on.
///
/// Declaration order is registry order: discovery runs and enrichment
/// lookups iterate kinds in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    YouTube,
    Skool,
    Patreon,
    Website,
    TikTok,
    Instagram,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        SourceKind::YouTube,
        SourceKind::Skool,
        SourceKind::Patreon,
        SourceKind::Website,
        SourceKind::TikTok,
        SourceKind::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::YouTube => "youtube",
            SourceKind::Skool => "skool",
            SourceKind::Patreon => "patreon",
            SourceKind::Website => "website",
            SourceKind::TikTok => "tiktok",
            SourceKind::Instagram => "instagram",
        }
    }

    /// Map a social-reference platform name (e.g. `"patreon"`) onto a source
    /// kind. Platforms with no adapter of their own (twitter, linkedin, ...)
    /// return `None`.
    pub fn from_platform_name(name: &str) -> Option<SourceKind> {
        name.parse().ok()
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = UnknownSourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lowered)
            .ok_or_else(|| UnknownSourceKind(s.to_string()))
    }
}

/// Identifies one profile at one source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub kind: SourceKind,
    pub source_id: String,
}

impl RecordKey {
    pub fn new(kind: SourceKind, source_id: impl Into<String>) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.source_id)
    }
}

/// Audience counts as reported by a source. Kept per kind because sources
/// disagree on what they count (YouTube subscribers, Skool members, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceMetrics {
    pub followers: u64,
    pub subscribers: u64,
    pub members: u64,
}

impl AudienceMetrics {
    pub fn total(&self) -> u64 {
        self.followers
            .saturating_add(self.subscribers)
            .saturating_add(self.members)
    }
}

/// Normalized profile snapshot from a single source.
///
/// Only adapters construct these. Once handed to the resolver a record is
/// owned by exactly one entity and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct SourceRecord {
    pub kind: SourceKind,
    #[builder(setter(into))]
    pub source_id: String,
    #[builder(setter(into))]
    pub name: String,
    #[builder(default, setter(into))]
    pub bio: String,
    #[builder(default, setter(strip_option, into))]
    pub email: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub website: Option<String>,
    /// Platform name → profile reference (URL or handle).
    #[builder(default)]
    pub social: BTreeMap<String, String>,
    #[builder(default)]
    pub audience: AudienceMetrics,
    #[builder(default)]
    pub tags: BTreeSet<String>,
    /// Hex colors extracted from profile imagery. Empty when none were extracted.
    #[builder(default)]
    pub palette: Vec<String>,
    #[builder(default, setter(strip_option, into))]
    pub profile_image_url: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub banner_image_url: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub location: Option<String>,
    #[builder(default = Utc::now())]
    pub fetched_at: DateTime<Utc>,
    /// Source payload passed through untouched.
    #[builder(default)]
    pub raw: serde_json::Value,
}

impl SourceRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.kind, self.source_id.clone())
    }

    pub fn audience_total(&self) -> u64 {
        self.audience.total()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Video,
    Post,
    Course,
    Tier,
    Blog,
}

/// One piece of content published by a profile (video, post, course...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: SourceKind,
    pub source_id: String,
    pub content_type: ContentType,
    pub title: String,
    pub description: String,
    /// Full text or transcript.
    pub body: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub media_urls: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: u64,
    pub engagement_count: u64,
    pub tags: Vec<String>,
    pub raw: serde_json::Value,
}

impl ContentItem {
    pub fn new(kind: SourceKind, source_id: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            content_type,
            title: String::new(),
            description: String::new(),
            body: String::new(),
            url: String::new(),
            thumbnail_url: None,
            media_urls: Vec::new(),
            published_at: None,
            view_count: 0,
            engagement_count: 0,
            tags: Vec::new(),
            raw: serde_json::Value::Null,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn with_counts(mut self, views: u64, engagement: u64) -> Self {
        self.view_count = views;
        self.engagement_count = engagement;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    #[default]
    Month,
    Year,
    OneTime,
}

/// A paid tier offered on a source (membership, course, subscription).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub kind: SourceKind,
    pub source_id: String,
    pub tier_name: String,
    pub price_amount: f64,
    pub currency: String,
    pub interval: BillingInterval,
    pub description: String,
    pub benefits: Vec<String>,
    pub member_count: u64,
}

impl PricingTier {
    pub fn new(
        kind: SourceKind,
        source_id: impl Into<String>,
        tier_name: impl Into<String>,
        price_amount: f64,
    ) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            tier_name: tier_name.into(),
            price_amount,
            currency: "USD".to_string(),
            interval: BillingInterval::default(),
            description: String::new(),
            benefits: Vec::new(),
            member_count: 0,
        }
    }

    pub fn with_interval(mut self, interval: BillingInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_benefits(mut self, benefits: Vec<String>) -> Self {
        self.benefits = benefits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_parses_case_insensitively() {
        assert_eq!("YouTube".parse::<SourceKind>().unwrap(), SourceKind::YouTube);
        assert_eq!(" patreon ".parse::<SourceKind>().unwrap(), SourceKind::Patreon);
        assert!("twitter".parse::<SourceKind>().is_err());
    }

    #[test]
    fn platform_names_without_adapters_map_to_none() {
        assert_eq!(SourceKind::from_platform_name("skool"), Some(SourceKind::Skool));
        assert_eq!(SourceKind::from_platform_name("linkedin"), None);
    }

    #[test]
    fn source_kind_serializes_lowercase() {
        let json = serde_json::to_string(&SourceKind::TikTok).unwrap();
        assert_eq!(json, "\"tiktok\"");
    }

    #[test]
    fn audience_total_sums_every_metric() {
        let audience = AudienceMetrics {
            followers: 10,
            subscribers: 200,
            members: 3,
        };
        assert_eq!(audience.total(), 213);
    }

    #[test]
    fn builder_defaults_optional_fields() {
        let record = SourceRecord::builder()
            .kind(SourceKind::Skool)
            .source_id("fit-club")
            .name("Fit Club")
            .build();

        assert!(record.email.is_none());
        assert!(record.social.is_empty());
        assert_eq!(record.audience_total(), 0);
        assert_eq!(record.key().to_string(), "skool:fit-club");
    }
}
