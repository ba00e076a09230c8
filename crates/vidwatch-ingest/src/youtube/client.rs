//! HTTP client for the paginated source endpoints
//!
//! One request per page. Transient failures (connection problems, timeouts,
//! 5xx and 429 answers) are retried with bounded exponential backoff; any
//! other failure status and malformed bodies fail the traversal immediately.

use crate::config::YoutubeConfig;
use crate::error::{IngestError, Result};
use crate::paginate::Page;
use crate::youtube::types::{PlaylistItem, PlaylistItemsPage, VideoDetail, VideoListPage};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

enum FetchFailure {
    Transient(reqwest::Error),
    Fatal(reqwest::Error),
}

/// Client for the playlist and video collections
pub struct YoutubeClient {
    http: Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl YoutubeClient {
    /// Create a new client from the source configuration
    pub fn new(config: &YoutubeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("vidwatch-ingest/0.1")
            .build()
            .map_err(|e| IngestError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Fetch one page of a playlist's entries
    pub async fn playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<PlaylistItem>> {
        let page: PlaylistItemsPage = self
            .get_page(
                super::PLAYLIST_ITEMS_ENDPOINT,
                &[("playlistId", playlist_id), ("part", "contentDetails")],
                page_token,
            )
            .await?;

        Ok(page.into())
    }

    /// Fetch one page of the video collection filtered by video id
    pub async fn videos_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<VideoDetail>> {
        let page: VideoListPage = self
            .get_page(
                super::VIDEOS_ENDPOINT,
                &[("id", video_id), ("part", "snippet,statistics")],
                page_token,
            )
            .await?;

        Ok(page.into())
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        selector: &[(&str, &str)],
        page_token: Option<&str>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut query: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        query.extend_from_slice(selector);
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let body = self
            .fetch_with_retry(endpoint, &url, &query, page_token)
            .await?;

        serde_json::from_slice(&body).map_err(|source| IngestError::SourceParse {
            endpoint,
            cursor: page_token.map(str::to_string),
            source,
        })
    }

    async fn fetch_with_retry(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, &str)],
        page_token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut delay = self.retry_delay;

        for attempt in 1..=self.max_retries {
            match self.fetch_once(url, query).await {
                Ok(body) => {
                    debug!(endpoint, cursor = ?page_token, bytes = body.len(), "fetched page");
                    return Ok(body);
                },
                Err(FetchFailure::Fatal(source)) => {
                    return Err(Self::fetch_error(endpoint, page_token, source));
                },
                Err(FetchFailure::Transient(source)) => {
                    if attempt == self.max_retries {
                        return Err(Self::fetch_error(endpoint, page_token, source));
                    }
                    warn!(
                        endpoint,
                        attempt,
                        max_retries = self.max_retries,
                        error = %source,
                        "transient fetch failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                },
            }
        }

        unreachable!("retry loop always returns")
    }

    async fn fetch_once(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<Vec<u8>, FetchFailure> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(FetchFailure::Transient)?;

        let status = response.status();
        match response.error_for_status() {
            Ok(response) => response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(FetchFailure::Transient),
            Err(source)
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS =>
            {
                Err(FetchFailure::Transient(source))
            },
            Err(source) => Err(FetchFailure::Fatal(source)),
        }
    }

    fn fetch_error(
        endpoint: &'static str,
        page_token: Option<&str>,
        source: reqwest::Error,
    ) -> IngestError {
        IngestError::SourceFetch {
            endpoint,
            cursor: page_token.map(str::to_string),
            source,
        }
    }
}
