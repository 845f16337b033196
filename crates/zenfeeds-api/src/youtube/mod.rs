//! YouTube Data API v3 client module.
//!
//! Fetches channel details, recent uploads per channel, and channel
//! search results.

mod api;
mod client;
mod rate_limiter;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalYoutubeApi, YoutubeApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{WATCH_BASE_URL, YoutubeClient, YoutubeClientBuilder};
pub use types::{
    ChannelDetails, ChannelSearchResult, ChannelSnippet, ChannelStatistics, ResourceId,
    Thumbnail, Thumbnails, Video, VideoId, VideoSnippet,
};
