//! Aggregation pass: resolve, load details, fetch videos, merge-sort.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::{StreamExt, stream};
use tracing::instrument;
use zenfeeds_api::youtube::{ChannelDetails, LocalYoutubeApi, Video};
use zenfeeds_db::ChannelRef;

use crate::loader::load_channel_details;
use crate::resolver::{ResolvedFeed, resolve_feed};
use crate::store::LocalDocumentStore;

/// Default bound on in-flight provider requests per phase.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// A provider video annotated with its source channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedVideo {
    /// The provider video.
    pub video: Video,
    /// Channel the video was fetched for.
    pub channel_id: String,
    /// Detail record of that channel, when it loaded.
    pub channel: Option<ChannelDetails>,
    /// Parsed publish time. `None` sorts after every parsed time.
    pub published: Option<DateTime<Utc>>,
}

impl FeedVideo {
    /// Channel title from the detail record, or the snippet.
    #[must_use]
    pub fn channel_title(&self) -> &str {
        if let Some(channel) = &self.channel {
            return &channel.snippet.title;
        }
        self.video
            .snippet
            .as_ref()
            .and_then(|s| s.channel_title.as_deref())
            .unwrap_or(&self.channel_id)
    }
}

/// Progress of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassEvent {
    /// Feed resolved. Always the first event.
    Resolved(ResolvedFeed),
    /// Channel details loaded.
    DetailsLoaded(HashMap<String, ChannelDetails>),
    /// Videos merged and sorted. Always the last event of a pass with channels.
    VideosLoaded(Vec<FeedVideo>),
}

/// Parses a provider publish timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD` (both as UTC).
#[must_use]
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Sorts newest first. Ties and unparsed times keep their input order.
pub fn sort_newest_first(videos: &mut [FeedVideo]) {
    videos.sort_by(|a, b| b.published.cmp(&a.published));
}

/// Fetches recent videos per channel, annotates and merges them.
///
/// A channel whose fetch fails contributes no videos.
#[instrument(skip_all, fields(channels = channels.len()))]
pub async fn aggregate_videos(
    api: &(impl LocalYoutubeApi + Sync),
    channels: &[ChannelRef],
    details: &HashMap<String, ChannelDetails>,
    max_concurrency: usize,
) -> Vec<FeedVideo> {
    let results: Vec<(&str, anyhow::Result<Vec<Video>>)> = stream::iter(channels)
        .map(|channel| async move {
            let id = channel.channel_id.as_str();
            (id, api.channel_videos(id).await)
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    let mut merged: Vec<FeedVideo> = Vec::new();
    for (channel_id, result) in results {
        let videos = match result {
            Ok(videos) => videos,
            Err(e) => {
                tracing::warn!(channel_id, error = %format!("{e:#}"), "failed to fetch channel videos");
                continue;
            }
        };

        let channel = details.get(channel_id);
        merged.extend(videos.into_iter().map(|video| {
            let published = video.published_at().and_then(parse_published);
            FeedVideo {
                video,
                channel_id: String::from(channel_id),
                channel: channel.cloned(),
                published,
            }
        }));
    }

    sort_newest_first(&mut merged);
    tracing::debug!(videos = merged.len(), "videos aggregated");
    merged
}

/// Runs aggregation passes against one provider and one store.
#[derive(Debug)]
pub struct Aggregator<'a, A, S> {
    api: &'a A,
    store: &'a S,
    max_concurrency: usize,
}

impl<A, S> Clone for Aggregator<'_, A, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, S> Copy for Aggregator<'_, A, S> {}

impl<'a, A, S> Aggregator<'a, A, S>
where
    A: LocalYoutubeApi + Sync,
    S: LocalDocumentStore + Sync,
{
    /// Creates an aggregator with the default concurrency bound.
    #[must_use]
    pub const fn new(api: &'a A, store: &'a S) -> Self {
        Self {
            api,
            store,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Sets the bound on in-flight provider requests.
    #[must_use]
    pub const fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// The provider this aggregator fetches from.
    #[must_use]
    pub const fn api(&self) -> &'a A {
        self.api
    }

    /// The store this aggregator resolves against.
    #[must_use]
    pub const fn store(&self) -> &'a S {
        self.store
    }

    /// Runs a full pass for feed `name` of `uid`, reporting each phase to `emit`.
    ///
    /// A feed without channels stops after `Resolved` and issues no
    /// provider request.
    #[instrument(skip_all, fields(feed = name))]
    pub async fn run_pass(&self, uid: &str, name: &str, emit: impl FnMut(PassEvent)) {
        let resolved = resolve_feed(self.store, uid, name).await;
        self.run_resolved(resolved, emit).await;
    }

    /// Runs the fetch phases of a pass for an already resolved feed.
    pub async fn run_resolved(&self, resolved: ResolvedFeed, mut emit: impl FnMut(PassEvent)) {
        if !resolved.has_channels() {
            emit(PassEvent::Resolved(resolved));
            return;
        }

        let channels = resolved.channels.clone();
        emit(PassEvent::Resolved(resolved));

        let details = load_channel_details(self.api, &channels, self.max_concurrency).await;
        emit(PassEvent::DetailsLoaded(details.clone()));

        let videos = aggregate_videos(self.api, &channels, &details, self.max_concurrency).await;
        emit(PassEvent::VideosLoaded(videos));
    }
}
