//! YouTube source adapter over the Data API v3.
//!
//! Channel search costs 100 quota units per call, lookups by id cost 1, so
//! discovery spreads its result budget across the search terms instead of
//! paging deep on any one of them.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use prospector_common::{
    extract, AudienceMetrics, ContentItem, ContentType, PricingTier, SourceAdapter, SourceError,
    SourceKind, SourceRecord, SourceResult, YouTubeConfig,
};
use youtube_client::{Channel, SearchResult, Video, YouTubeClient, YouTubeError, MAX_PAGE_SIZE};

const KIND: SourceKind = SourceKind::YouTube;

pub struct YouTubeAdapter {
    client: YouTubeClient,
    relevance_language: String,
}

impl YouTubeAdapter {
    pub fn new(client: YouTubeClient, config: &YouTubeConfig) -> Self {
        Self {
            client,
            relevance_language: config.relevance_language.clone(),
        }
    }
}

fn unavailable(err: YouTubeError) -> SourceError {
    SourceError::unavailable(KIND, err)
}

/// Results requested per search term: an even share of the budget, at least
/// one, never more than one API page.
fn results_per_term(max_results: usize, terms: usize) -> usize {
    (max_results / terms.max(1)).clamp(1, MAX_PAGE_SIZE)
}

/// Channel ids are `UC` followed by 22 url-safe characters. Anything else
/// is treated as a handle.
fn is_channel_id(id: &str) -> bool {
    id.len() == 24
        && id.starts_with("UC")
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Lightweight record from a search hit. Audience is unknown until the
/// channel is fetched.
fn record_from_search(result: &SearchResult, channel_id: String) -> SourceRecord {
    let snippet = &result.snippet;
    let mut record = SourceRecord::builder()
        .kind(KIND)
        .source_id(channel_id)
        .name(snippet.title.clone())
        .bio(snippet.description.clone())
        .social(extract::social_references(&snippet.description))
        .tags(extract::niche_tags(&snippet.description))
        .raw(serde_json::to_value(result).unwrap_or_default())
        .build();
    record.profile_image_url = snippet.thumbnails.best_url().map(String::from);
    record
}

fn record_from_channel(channel: &Channel) -> SourceRecord {
    let snippet = &channel.snippet;
    let branding = &channel.branding_settings;

    let mut record = SourceRecord::builder()
        .kind(KIND)
        .source_id(channel.id.clone())
        .name(snippet.title.clone())
        .bio(snippet.description.clone())
        .social(extract::social_references(&snippet.description))
        .tags(extract::niche_tags(&snippet.description))
        .audience(AudienceMetrics {
            subscribers: channel.statistics.subscribers(),
            ..Default::default()
        })
        .raw(serde_json::to_value(channel).unwrap_or_default())
        .build();

    record.profile_image_url = snippet.thumbnails.best_url().map(String::from);
    record.banner_image_url = branding
        .image
        .as_ref()
        .and_then(|image| image.banner_external_url.clone());
    record.location = snippet.country.clone().or_else(|| {
        branding
            .channel
            .as_ref()
            .and_then(|channel| channel.country.clone())
    });
    record
}

fn content_from_video(video: &Video) -> ContentItem {
    let mut item = ContentItem::new(KIND, video.id.clone(), ContentType::Video)
        .with_url(format!("https://www.youtube.com/watch?v={}", video.id))
        .with_counts(video.statistics.views(), video.statistics.engagement());

    if let Some(snippet) = &video.snippet {
        item = item
            .with_title(snippet.title.clone())
            .with_description(snippet.description.clone())
            .with_tags(snippet.tags.clone());
        if let Some(url) = snippet.thumbnails.best_url() {
            item = item.with_thumbnail(url);
        }
        if let Some(at) = snippet.published_at {
            item = item.with_published_at(at);
        }
    }

    item.with_raw(serde_json::to_value(video).unwrap_or_default())
}

#[async_trait]
impl SourceAdapter for YouTubeAdapter {
    fn kind(&self) -> SourceKind {
        KIND
    }

    async fn discover(
        &self,
        search_terms: &[String],
        max_results: usize,
    ) -> SourceResult<Vec<SourceRecord>> {
        let per_term = results_per_term(max_results, search_terms.len());
        let mut seen = HashSet::new();
        let mut discovered = Vec::new();
        let mut last_error = None;

        for term in search_terms {
            if discovered.len() >= max_results {
                break;
            }

            let results = match self
                .client
                .search_channels(term, per_term, &self.relevance_language)
                .await
            {
                Ok(results) => results,
                Err(e) if e.is_quota_exceeded() => {
                    warn!(term, "YouTube quota exhausted, stopping search");
                    last_error = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(term, error = %e, "YouTube search failed");
                    last_error = Some(e);
                    continue;
                }
            };

            for result in &results {
                let channel_id = result
                    .id
                    .channel_id
                    .clone()
                    .unwrap_or_else(|| result.snippet.channel_id.clone());
                if !seen.insert(channel_id.clone()) {
                    continue;
                }
                discovered.push(record_from_search(result, channel_id));
            }
        }

        // Every search failing is a source failure, not an empty result.
        if discovered.is_empty() {
            if let Some(err) = last_error {
                return Err(unavailable(err));
            }
        }

        discovered.truncate(max_results);
        info!(
            terms = search_terms.len(),
            channels = discovered.len(),
            "YouTube discovery complete"
        );
        Ok(discovered)
    }

    async fn fetch_entity(&self, source_id: &str) -> SourceResult<SourceRecord> {
        let channel = if is_channel_id(source_id) {
            self.client.channel(source_id).await
        } else {
            debug!(handle = source_id, "Looking up YouTube channel by handle");
            self.client.channel_by_handle(source_id).await
        }
        .map_err(unavailable)?;

        channel
            .map(|c| record_from_channel(&c))
            .ok_or_else(|| SourceError::not_found(KIND, source_id))
    }

    async fn fetch_content(
        &self,
        source_id: &str,
        max_items: usize,
    ) -> SourceResult<Vec<ContentItem>> {
        if max_items == 0 {
            return Ok(Vec::new());
        }

        let recent = self
            .client
            .recent_videos(source_id, max_items)
            .await
            .map_err(unavailable)?;
        let video_ids: Vec<String> = recent
            .iter()
            .filter_map(|result| result.id.video_id.clone())
            .collect();

        let videos = self.client.videos(&video_ids).await.map_err(unavailable)?;

        // Keep upload order from the search, not the videos.list order.
        let mut items: Vec<ContentItem> = video_ids
            .iter()
            .filter_map(|id| videos.iter().find(|v| &v.id == id))
            .map(content_from_video)
            .collect();
        items.truncate(max_items);
        Ok(items)
    }

    /// YouTube has no native pricing; tiers are found by following links to
    /// Patreon, Skool or a website.
    async fn fetch_pricing(&self, _source_id: &str) -> SourceResult<Vec<PricingTier>> {
        Ok(Vec::new())
    }
}
