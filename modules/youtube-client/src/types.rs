use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope shared by every `*.list` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

// --- Shared ---

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available thumbnail URL.
    pub fn best_url(&self) -> Option<&str> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thumbnail {
    pub url: String,
}

/// The Data API returns counters as decimal strings.
fn parse_count(value: &Option<String>) -> u64 {
    value
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

// --- search.list ---

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: SearchSnippet,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResultId {
    pub kind: String,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
}

// --- channels.list ---

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: ChannelStatistics,
    #[serde(rename = "brandingSettings", default)]
    pub branding_settings: BrandingSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub country: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    pub subscriber_count: Option<String>,
}

impl ChannelStatistics {
    pub fn subscribers(&self) -> u64 {
        parse_count(&self.subscriber_count)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrandingSettings {
    pub channel: Option<BrandingChannel>,
    pub image: Option<BrandingImage>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrandingChannel {
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrandingImage {
    #[serde(rename = "bannerExternalUrl")]
    pub banner_external_url: Option<String>,
}

// --- videos.list ---

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Video {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VideoStatistics {
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    pub fn views(&self) -> u64 {
        parse_count(&self.view_count)
    }

    /// Likes plus comments.
    pub fn engagement(&self) -> u64 {
        parse_count(&self.like_count).saturating_add(parse_count(&self.comment_count))
    }
}
