//! `YoutubeClient` - YouTube Data API v3 client implementation.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::api::LocalYoutubeApi;
use super::rate_limiter::{DEFAULT_MIN_INTERVAL, RequestGate};
use super::types::{
    ChannelDetails, ChannelListResponse, ChannelSearchResult, ErrorResponse, SearchListResponse,
    Video,
};

/// Base URL for video watch pages.
pub const WATCH_BASE_URL: &str = "https://www.youtube.com/watch";

/// Default base URL for the YouTube Data API v3.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Default number of items requested per list call.
const DEFAULT_MAX_RESULTS: u32 = 10;

/// Upper bound accepted by the API for `maxResults`.
const MAX_RESULTS_LIMIT: u32 = 50;

/// YouTube Data API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct YoutubeClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key sent as the `key` query parameter.
    api_key: String,
    /// `maxResults` for search calls.
    max_results: u32,
    /// Spacing of request starts, shared by concurrent calls.
    gate: RequestGate,
}

/// Builder for `YoutubeClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct YoutubeClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
    max_results: Option<u32>,
}

impl YoutubeClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            min_interval: None,
            max_results: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 50ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Sets `maxResults` for list calls (default: 10, clamped to 1..=50).
    #[must_use]
    pub const fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or empty.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<YoutubeClient> {
        let api_key = self.api_key.context("api_key is required")?;
        if api_key.trim().is_empty() {
            bail!("api_key must not be empty");
        }
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let gate = RequestGate::new(self.min_interval.unwrap_or(DEFAULT_MIN_INTERVAL));

        let max_results = self
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_LIMIT);

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(YoutubeClient {
            http_client,
            base_url,
            api_key,
            max_results,
            gate,
        })
    }
}

impl YoutubeClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> YoutubeClientBuilder {
        YoutubeClientBuilder::new()
    }

    /// Sends a GET request with the API key and query params, after the
    /// request gate. Failures are returned as-is; there is no retry.
    #[instrument(skip_all)]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.gate.wait().await;

        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let request = self
            .http_client
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .build()
            .with_context(|| format!("failed to build request: {path}"))?;

        tracing::debug!(path, query = ?query, "YouTube API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&body) {
                bail!(
                    "YouTube API error (HTTP {}): code={}, message={}",
                    status,
                    error_response.error.code,
                    error_response.error.message,
                );
            }
            bail!("YouTube API error (HTTP {status}): {body}");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;
        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        raw_result.with_context(|| format!("failed to decode JSON response: {path}"))
    }
}

impl LocalYoutubeApi for YoutubeClient {
    #[instrument(skip_all, fields(channel_id = %channel_id))]
    async fn channel_details(&self, channel_id: &str) -> Result<ChannelDetails> {
        let query = [
            ("part", String::from("snippet,statistics")),
            ("id", String::from(channel_id)),
        ];
        let response: ChannelListResponse = self.get_json("channels", &query).await?;

        response
            .items
            .into_iter()
            .next()
            .with_context(|| format!("channel not found: {channel_id}"))
    }

    #[instrument(skip_all, fields(channel_id = %channel_id))]
    async fn channel_videos(&self, channel_id: &str) -> Result<Vec<Video>> {
        let query = [
            ("part", String::from("snippet")),
            ("channelId", String::from(channel_id)),
            ("order", String::from("date")),
            ("type", String::from("video")),
            ("maxResults", self.max_results.to_string()),
        ];
        let response: SearchListResponse<Video> = self.get_json("search", &query).await?;
        Ok(response.items)
    }

    #[instrument(skip_all)]
    async fn search_channels(&self, query: &str) -> Result<Vec<ChannelSearchResult>> {
        let params = [
            ("part", String::from("snippet")),
            ("type", String::from("channel")),
            ("q", String::from(query)),
            ("maxResults", self.max_results.to_string()),
        ];
        let response: SearchListResponse<ChannelSearchResult> =
            self.get_json("search", &params).await?;
        Ok(response.items)
    }
}
