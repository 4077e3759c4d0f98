pub mod error;
pub mod types;

pub use error::{Result, YouTubeError};
pub use types::{
    BrandingSettings, Channel, ChannelSnippet, ChannelStatistics, ListResponse, SearchResult,
    SearchSnippet, Thumbnails, Video, VideoSnippet, VideoStatistics,
};

use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest page the Data API serves for `maxResults`.
pub const MAX_PAGE_SIZE: usize = 50;

/// Quota cost in units: search.list = 100, channels.list = 1, videos.list = 1.
/// Callers budget search calls; lookups by id are cheap.
#[derive(Clone)]
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// search.list restricted to channels.
    pub async fn search_channels(
        &self,
        query: &str,
        max_results: usize,
        relevance_language: &str,
    ) -> Result<Vec<SearchResult>> {
        let resp: ListResponse<SearchResult> = self
            .get(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("type", "channel".to_string()),
                    ("q", query.to_string()),
                    ("maxResults", page_size(max_results)),
                    ("relevanceLanguage", relevance_language.to_string()),
                ],
            )
            .await?;
        tracing::debug!(query, results = resp.items.len(), "YouTube channel search");
        Ok(resp.items)
    }

    /// channels.list by channel id. `None` when the id does not exist.
    pub async fn channel(&self, channel_id: &str) -> Result<Option<Channel>> {
        self.channel_by("id", channel_id.to_string()).await
    }

    /// channels.list by `@handle` (the leading `@` is optional).
    pub async fn channel_by_handle(&self, handle: &str) -> Result<Option<Channel>> {
        let handle = format!("@{}", handle.trim_start_matches('@'));
        self.channel_by("forHandle", handle).await
    }

    async fn channel_by(&self, filter: &str, value: String) -> Result<Option<Channel>> {
        let resp: ListResponse<Channel> = self
            .get(
                "channels",
                &[
                    ("part", "snippet,statistics,brandingSettings".to_string()),
                    (filter, value),
                ],
            )
            .await?;
        Ok(resp.items.into_iter().next())
    }

    /// Most recent uploads for a channel, newest first.
    pub async fn recent_videos(&self, channel_id: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let resp: ListResponse<SearchResult> = self
            .get(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("type", "video".to_string()),
                    ("channelId", channel_id.to_string()),
                    ("order", "date".to_string()),
                    ("maxResults", page_size(max_results)),
                ],
            )
            .await?;
        Ok(resp.items)
    }

    /// videos.list with snippet and statistics for up to 50 ids.
    pub async fn videos(&self, video_ids: &[String]) -> Result<Vec<Video>> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = video_ids
            .iter()
            .take(MAX_PAGE_SIZE)
            .cloned()
            .collect::<Vec<_>>()
            .join(",");

        let resp: ListResponse<Video> = self
            .get(
                "videos",
                &[("part", "snippet,statistics".to_string()), ("id", ids)],
            )
            .await?;
        Ok(resp.items)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn page_size(requested: usize) -> String {
    requested.clamp(1, MAX_PAGE_SIZE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped_to_api_bounds() {
        assert_eq!(page_size(0), "1");
        assert_eq!(page_size(20), "20");
        assert_eq!(page_size(500), "50");
    }

    #[test]
    fn with_base_url_overrides_default() {
        let client = YouTubeClient::new("key").with_base_url("http://localhost:9000");
        assert_eq!(client.base_url, "http://localhost:9000");
        assert_eq!(client.api_key, "key");
    }

    #[test]
    fn quota_errors_are_recognised() {
        let quota = YouTubeError::Api {
            status: 403,
            message: r#"{"error":{"errors":[{"reason":"quotaExceeded"}]}}"#.into(),
        };
        assert!(quota.is_quota_exceeded());

        let forbidden = YouTubeError::Api {
            status: 403,
            message: "forbidden".into(),
        };
        assert!(!forbidden.is_quota_exceeded());
    }
}
