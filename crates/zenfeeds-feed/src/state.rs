//! Load state of one feed view.

use std::collections::HashMap;

use zenfeeds_api::youtube::ChannelDetails;
use zenfeeds_db::{ChannelRef, Feed};

use crate::aggregator::{FeedVideo, PassEvent};

/// Display phase of a feed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing resolved yet.
    InitialLoad,
    /// Feed resolved with no channels. Nothing more is fetched.
    NoChannels,
    /// Channels known, videos still being fetched.
    LoadingVideos,
    /// Merged video list available (possibly empty).
    VideosReady,
}

impl LoadPhase {
    /// Returns `true` while a spinner should be shown.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::InitialLoad | Self::LoadingVideos)
    }
}

/// Identifier of one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// All state of one feed view instance.
///
/// Changed only by [`FeedViewState::begin_pass`] and
/// [`FeedViewState::apply`]; events from any run other than the current
/// one are dropped.
#[derive(Debug, Clone)]
pub struct FeedViewState {
    feed_name: String,
    feed: Option<Feed>,
    channels: Vec<ChannelRef>,
    details: HashMap<String, ChannelDetails>,
    videos: Vec<FeedVideo>,
    phase: LoadPhase,
    current_run: RunId,
}

impl FeedViewState {
    /// Creates the state for feed `name` in `InitialLoad`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            feed_name: name.into(),
            feed: None,
            channels: Vec::new(),
            details: HashMap::new(),
            videos: Vec::new(),
            phase: LoadPhase::InitialLoad,
            current_run: RunId(0),
        }
    }

    /// Name of the feed this view shows.
    #[must_use]
    pub fn feed_name(&self) -> &str {
        &self.feed_name
    }

    /// Resolved feed metadata.
    #[must_use]
    pub const fn feed(&self) -> Option<&Feed> {
        self.feed.as_ref()
    }

    /// Resolved channel mapping.
    #[must_use]
    pub fn channels(&self) -> &[ChannelRef] {
        &self.channels
    }

    /// Loaded channel details keyed by channel ID.
    #[must_use]
    pub const fn details(&self) -> &HashMap<String, ChannelDetails> {
        &self.details
    }

    /// Merged newest-first videos.
    #[must_use]
    pub fn videos(&self) -> &[FeedVideo] {
        &self.videos
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Points the view at another feed name (after a rename).
    pub fn set_feed_name(&mut self, name: impl Into<String>) {
        self.feed_name = name.into();
    }

    /// Starts a new pass: clears everything back to `InitialLoad` and
    /// supersedes the previous run.
    pub fn begin_pass(&mut self) -> RunId {
        self.current_run = RunId(self.current_run.0.saturating_add(1));
        self.feed = None;
        self.channels.clear();
        self.details.clear();
        self.videos.clear();
        self.phase = LoadPhase::InitialLoad;
        self.current_run
    }

    /// Applies an event of `run`. Returns `false` when the event is stale.
    pub fn apply(&mut self, run: RunId, event: PassEvent) -> bool {
        if run != self.current_run {
            tracing::debug!(
                run = run.get(),
                current = self.current_run.get(),
                "dropping event of superseded pass"
            );
            return false;
        }

        match event {
            PassEvent::Resolved(resolved) => {
                self.feed = resolved.feed;
                self.channels = resolved.channels;
                self.phase = if self.channels.is_empty() {
                    LoadPhase::NoChannels
                } else {
                    LoadPhase::LoadingVideos
                };
            }
            PassEvent::DetailsLoaded(details) => {
                if self.phase == LoadPhase::LoadingVideos {
                    self.details = details;
                }
            }
            PassEvent::VideosLoaded(videos) => {
                if self.phase == LoadPhase::LoadingVideos {
                    self.videos = videos;
                    self.phase = LoadPhase::VideosReady;
                }
            }
        }
        true
    }
}
