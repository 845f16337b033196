//! YouTube Data API response types.

use serde::Deserialize;

use super::client::WATCH_BASE_URL;

// --- Shared ---

/// Thumbnail set attached to channel and video snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Thumbnails {
    /// 88x88 (channels) or 120x90 (videos).
    pub default: Option<Thumbnail>,
    /// 240x240 (channels) or 320x180 (videos).
    pub medium: Option<Thumbnail>,
    /// 800x800 (channels) or 480x360 (videos).
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Returns the largest available thumbnail URL.
    #[must_use]
    pub fn best_url(&self) -> Option<&str> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

/// A single thumbnail image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thumbnail {
    /// Image URL.
    pub url: String,
    /// Width in pixels.
    pub width: Option<u32>,
    /// Height in pixels.
    pub height: Option<u32>,
}

/// Resource identifier returned by `search` results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    /// Resource kind (e.g. `youtube#video`, `youtube#channel`).
    #[serde(default)]
    pub kind: String,
    /// Video ID when `kind` is `youtube#video`.
    pub video_id: Option<String>,
    /// Channel ID when `kind` is `youtube#channel`.
    pub channel_id: Option<String>,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    /// Error payload.
    pub error: ErrorBody,
}

/// Inner error payload.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    /// HTTP-like status code.
    pub code: u16,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
}

// --- Channels ---

/// Response from the `channels` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChannelListResponse {
    /// Matching channels (empty when the ID is unknown).
    #[serde(default)]
    pub items: Vec<ChannelDetails>,
}

/// Detail record of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelDetails {
    /// Channel ID.
    pub id: String,
    /// Channel snippet.
    pub snippet: ChannelSnippet,
    /// Channel statistics (only when `part=statistics` was requested).
    pub statistics: Option<ChannelStatistics>,
}

/// Channel snippet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    /// Channel title.
    pub title: String,
    /// Channel description.
    #[serde(default)]
    pub description: String,
    /// Channel handle (e.g. `@rustlang`).
    pub custom_url: Option<String>,
    /// Channel creation timestamp (RFC 3339).
    pub published_at: Option<String>,
    /// Channel avatars.
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Channel statistics. The API encodes counts as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    /// Total views.
    pub view_count: Option<String>,
    /// Subscriber count (absent when hidden).
    pub subscriber_count: Option<String>,
    /// Whether the subscriber count is hidden.
    #[serde(default)]
    pub hidden_subscriber_count: bool,
    /// Number of public videos.
    pub video_count: Option<String>,
}

// --- Search ---

/// Response from the `search` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchListResponse<T> {
    /// Search results.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Video identifier: a plain string (`videos` endpoint) or a resource
/// object (`search` endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VideoId {
    /// Plain video ID.
    Plain(String),
    /// `{ "kind": "youtube#video", "videoId": "..." }`.
    Resource(ResourceId),
}

/// A video as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// Provider-assigned identifier.
    pub id: VideoId,
    /// Video snippet (title, publish time, ...).
    pub snippet: Option<VideoSnippet>,
}

impl Video {
    /// Returns the provider video ID, if any.
    #[must_use]
    pub fn video_id(&self) -> Option<&str> {
        match &self.id {
            VideoId::Plain(id) => Some(id.as_str()),
            VideoId::Resource(resource) => resource.video_id.as_deref(),
        }
    }

    /// Returns the raw `publishedAt` value, if any.
    #[must_use]
    pub fn published_at(&self) -> Option<&str> {
        self.snippet.as_ref()?.published_at.as_deref()
    }

    /// Returns the video title, or an empty string when the snippet is missing.
    #[must_use]
    pub fn title(&self) -> &str {
        self.snippet.as_ref().map_or("", |s| s.title.as_str())
    }

    /// Returns the watch page URL.
    #[must_use]
    pub fn watch_url(&self) -> Option<String> {
        self.video_id()
            .map(|id| format!("{WATCH_BASE_URL}?v={id}"))
    }
}

/// Video snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    /// Publish timestamp (RFC 3339).
    pub published_at: Option<String>,
    /// Uploading channel ID.
    pub channel_id: Option<String>,
    /// Uploading channel title.
    pub channel_title: Option<String>,
    /// Video title.
    #[serde(default)]
    pub title: String,
    /// Video description.
    #[serde(default)]
    pub description: String,
    /// Video thumbnails.
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// `none`, `upcoming` or `live`.
    pub live_broadcast_content: Option<String>,
}

/// A channel search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct ChannelSearchResult {
    /// Resource identifier (`kind` = `youtube#channel`).
    pub id: ResourceId,
    /// Search snippet.
    pub snippet: VideoSnippet,
}

impl ChannelSearchResult {
    /// Returns the channel ID from the resource ID or the snippet.
    #[must_use]
    pub fn channel_id(&self) -> Option<&str> {
        self.id
            .channel_id
            .as_deref()
            .or(self.snippet.channel_id.as_deref())
    }

    /// Returns the channel title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.snippet
            .channel_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.snippet.title)
    }
}
