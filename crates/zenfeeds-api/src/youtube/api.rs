//! `YoutubeApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{ChannelDetails, ChannelSearchResult, Video};

/// YouTube Data API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(YoutubeApi: Send)]
pub trait LocalYoutubeApi {
    /// Fetches the detail record (snippet + statistics) of one channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails, or if the
    /// channel does not exist.
    async fn channel_details(&self, channel_id: &str) -> Result<ChannelDetails>;

    /// Fetches the most recent uploads of one channel, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn channel_videos(&self, channel_id: &str) -> Result<Vec<Video>>;

    /// Searches channels by free-text query.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn search_channels(&self, query: &str) -> Result<Vec<ChannelSearchResult>>;
}
