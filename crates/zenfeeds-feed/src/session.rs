//! One feed view: its state, its passes and its mutations.

use std::time::Duration;

use tracing::instrument;
use zenfeeds_api::youtube::LocalYoutubeApi;
use zenfeeds_db::{ChannelRef, Feed};

use crate::aggregator::Aggregator;
use crate::mutations::{self, FeedUpdate};
use crate::names::same_feed_name;
use crate::resolver::ResolvedFeed;
use crate::state::FeedViewState;
use crate::store::LocalDocumentStore;

/// Where the user should be after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Stay on the current feed.
    Stay,
    /// Back to the feed list.
    Home,
    /// Go to the feed with this name (after a rename).
    Feed(String),
}

/// Owns the [`FeedViewState`] of one feed view.
///
/// Mutation failures are logged and reported as `None`; they never
/// leave the view in a loading state.
#[derive(Debug)]
pub struct FeedSession<'a, A, S> {
    aggregator: Aggregator<'a, A, S>,
    uid: String,
    state: FeedViewState,
    settle_delay: Duration,
}

impl<'a, A, S> FeedSession<'a, A, S>
where
    A: LocalYoutubeApi + Sync,
    S: LocalDocumentStore + Sync,
{
    /// Creates a session for feed `name` of `uid`. Nothing is loaded yet.
    pub fn new(aggregator: Aggregator<'a, A, S>, uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            aggregator,
            uid: uid.into(),
            state: FeedViewState::new(name),
            settle_delay: Duration::ZERO,
        }
    }

    /// Sets the delay before re-resolving after a mutation.
    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Current view state.
    #[must_use]
    pub const fn state(&self) -> &FeedViewState {
        &self.state
    }

    /// Mutable view state, for callers that drive passes themselves.
    pub const fn state_mut(&mut self) -> &mut FeedViewState {
        &mut self.state
    }

    /// The aggregator passes run on.
    #[must_use]
    pub const fn aggregator(&self) -> Aggregator<'a, A, S> {
        self.aggregator
    }

    /// Signed-in user ID.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Runs a full pass, superseding any earlier one.
    #[instrument(skip_all, fields(feed = self.state.feed_name()))]
    pub async fn refresh(&mut self) {
        let run = self.state.begin_pass();
        let name = String::from(self.state.feed_name());
        let uid = self.uid.as_str();
        let state = &mut self.state;

        self.aggregator
            .run_pass(uid, &name, |event| {
                state.apply(run, event);
            })
            .await;
    }

    /// Deletes the feed. Returns `Home` on success.
    pub async fn delete(&mut self) -> Option<Navigation> {
        let name = String::from(self.state.feed_name());
        match mutations::delete_feed(self.aggregator.store(), &self.uid, &name).await {
            Ok(true) => Some(Navigation::Home),
            Ok(false) => {
                tracing::warn!(feed = %name, "feed was already gone");
                Some(Navigation::Home)
            }
            Err(e) => {
                tracing::error!(feed = %name, error = %format!("{e:#}"), "failed to delete feed");
                None
            }
        }
    }

    /// Applies `update` and re-resolves the feed.
    ///
    /// Returns `Feed(new_name)` when the feed was renamed.
    pub async fn update(&mut self, update: &FeedUpdate) -> Option<Navigation> {
        let name = String::from(self.state.feed_name());
        let feed = match mutations::update_feed(self.aggregator.store(), &self.uid, &name, update)
            .await
        {
            Ok(feed) => feed,
            Err(e) => {
                tracing::error!(feed = %name, error = %format!("{e:#}"), "failed to update feed");
                return None;
            }
        };

        let renamed = !same_feed_name(&feed.name, &name);
        if renamed {
            self.state.set_feed_name(feed.name.clone());
        }
        self.reload_after_mutation(&feed).await;

        Some(if renamed {
            Navigation::Feed(feed.name)
        } else {
            Navigation::Stay
        })
    }

    /// Adds `channel` and re-resolves the feed.
    pub async fn add_channel(&mut self, channel: ChannelRef) -> Option<Navigation> {
        let name = String::from(self.state.feed_name());
        match mutations::add_channel(self.aggregator.store(), &self.uid, &name, channel).await {
            Ok(feed) => {
                self.reload_after_mutation(&feed).await;
                Some(Navigation::Stay)
            }
            Err(e) => {
                tracing::error!(feed = %name, error = %format!("{e:#}"), "failed to add channel");
                None
            }
        }
    }

    /// Re-runs a full pass after a write and checks it saw the write.
    ///
    /// When the re-read feed differs from `expected` in any field, the
    /// pass is run again on `expected` directly.
    async fn reload_after_mutation(&mut self, expected: &Feed) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        self.refresh().await;

        if self.state.feed() == Some(expected) {
            return;
        }

        tracing::warn!(
            feed = %expected.name,
            read = ?self.state.feed().map(|f| f.name.as_str()),
            "store returned a stale feed; using the written feed"
        );
        let run = self.state.begin_pass();
        let state = &mut self.state;
        self.aggregator
            .run_resolved(ResolvedFeed::from_feed(expected.clone()), |event| {
                state.apply(run, event);
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    use anyhow::Result;
    use zenfeeds_db::UserRecord;

    use super::*;
    use crate::state::LoadPhase;
    use crate::test_support::{MockStore, MockYoutubeApi, make_feed, make_video, sqlite_store};

    /// Store whose first read after each write still returns the old record.
    struct LaggingStore {
        inner: MockStore,
        stale: Mutex<Option<Option<UserRecord>>>,
    }

    impl LocalDocumentStore for LaggingStore {
        async fn read_record(&self, uid: &str) -> Result<Option<UserRecord>> {
            if let Some(stale) = self.stale.lock().unwrap().take() {
                return Ok(stale);
            }
            self.inner.read_record(uid).await
        }

        async fn write_record(&self, uid: &str, record: &UserRecord) -> Result<()> {
            *self.stale.lock().unwrap() = Some(self.inner.snapshot());
            self.inner.write_record(uid, record).await
        }

        async fn append_feed(&self, uid: &str, feed: &Feed) -> Result<()> {
            self.inner.append_feed(uid, feed).await
        }
    }

    #[tokio::test]
    async fn test_refresh_orders_videos_and_annotates_details() {
        // Arrange
        let api = MockYoutubeApi::new().with_videos(
            "c1",
            vec![
                make_video("jan", "c1", Some("2024-01-01")),
                make_video("jun", "c1", Some("2024-06-01")),
            ],
        );
        let store = MockStore::with_feeds(vec![make_feed("Tech", &[("c1", "Ch1")])]);
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");

        // Act
        session.refresh().await;

        // Assert
        let state = session.state();
        assert_eq!(state.phase(), LoadPhase::VideosReady);
        let ids: Vec<&str> = state
            .videos()
            .iter()
            .filter_map(|v| v.video.video_id())
            .collect();
        assert_eq!(ids, vec!["jun", "jan"]);
        assert!(
            state
                .videos()
                .iter()
                .all(|v| v.channel.as_ref().is_some_and(|c| c.id == "c1"))
        );
    }

    #[tokio::test]
    async fn test_empty_feed_never_enters_loading_videos() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore::with_feeds(vec![make_feed("Empty", &[])]);
        let aggregator = Aggregator::new(&api, &store);
        let mut state = FeedViewState::new("Empty");
        let run = state.begin_pass();
        let mut phases = vec![state.phase()];

        // Act
        aggregator
            .run_pass("u1", "Empty", |event| {
                state.apply(run, event);
                phases.push(state.phase());
            })
            .await;

        // Assert
        assert_eq!(phases, vec![LoadPhase::InitialLoad, LoadPhase::NoChannels]);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_feed_shows_no_channels() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore::default();
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Ghost");

        // Act
        session.refresh().await;

        // Assert
        assert_eq!(session.state().phase(), LoadPhase::NoChannels);
        assert!(session.state().feed().is_none());
    }

    #[tokio::test]
    async fn test_add_channel_re_resolves_in_full() {
        // Arrange
        let api = MockYoutubeApi::new()
            .with_videos("c1", vec![make_video("a", "c1", Some("2024-01-01"))])
            .with_videos("c2", vec![make_video("b", "c2", Some("2024-02-01"))]);
        let (store, _dir) = sqlite_store();
        mutations::create_feed(&store, "u1", "Tech", "").await.unwrap();
        mutations::add_channel(&store, "u1", "Tech", ChannelRef::new("c1", "Ch1"))
            .await
            .unwrap();
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");
        session.refresh().await;

        // Act
        let nav = session.add_channel(ChannelRef::new("c2", "Ch2")).await;

        // Assert
        assert_eq!(nav, Some(Navigation::Stay));
        assert_eq!(session.state().channels().len(), 2);
        let ids: Vec<&str> = session
            .state()
            .videos()
            .iter()
            .filter_map(|v| v.video.video_id())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        // c1 fetched by the first pass and again by the re-resolution
        assert_eq!(api.video_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_add_channel_to_empty_feed_loads_videos() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore::with_feeds(vec![make_feed("Empty", &[])]);
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Empty");
        session.refresh().await;
        assert_eq!(session.state().phase(), LoadPhase::NoChannels);

        // Act
        session.add_channel(ChannelRef::new("c1", "Ch1")).await;

        // Assert
        assert_eq!(session.state().phase(), LoadPhase::VideosReady);
    }

    #[tokio::test]
    async fn test_rename_navigates_to_new_name() {
        // Arrange
        let api = MockYoutubeApi::new();
        let (store, _dir) = sqlite_store();
        mutations::create_feed(&store, "u1", "A", "").await.unwrap();
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "A");
        let update = FeedUpdate {
            name: Some(String::from("B")),
            ..FeedUpdate::default()
        };

        // Act
        let nav = session.update(&update).await;

        // Assert
        assert_eq!(nav, Some(Navigation::Feed(String::from("B"))));
        assert_eq!(session.state().feed_name(), "B");
        assert_eq!(session.state().feed().unwrap().name, "B");
    }

    #[tokio::test]
    async fn test_update_without_rename_stays() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore::with_feeds(vec![make_feed("Tech", &[("c1", "Ch1")])]);
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");
        let update = FeedUpdate {
            image: Some(String::from("cover.png")),
            ..FeedUpdate::default()
        };

        // Act
        let nav = session.update(&update).await;

        // Assert
        assert_eq!(nav, Some(Navigation::Stay));
        assert_eq!(session.state().feed().unwrap().image, "cover.png");
    }

    #[tokio::test]
    async fn test_update_failure_returns_none() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore {
            fail_writes: true,
            ..MockStore::with_feeds(vec![make_feed("Tech", &[])])
        };
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");

        // Act
        let nav = session
            .update(&FeedUpdate {
                image: Some(String::from("x")),
                ..FeedUpdate::default()
            })
            .await;

        // Assert
        assert_eq!(nav, None);
        assert_eq!(session.state().feed_name(), "Tech");
    }

    #[tokio::test]
    async fn test_delete_navigates_home() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore::with_feeds(vec![make_feed("Tech", &[])]);
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");

        // Act
        let nav = session.delete().await;

        // Assert
        assert_eq!(nav, Some(Navigation::Home));
        assert!(store.snapshot().unwrap().feeds.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_returns_none() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore {
            fail_writes: true,
            ..MockStore::with_feeds(vec![make_feed("Tech", &[])])
        };
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");

        // Act
        let nav = session.delete().await;

        // Assert
        assert_eq!(nav, None);
    }

    #[tokio::test]
    async fn test_stale_read_after_write_uses_written_membership() {
        // Arrange
        let api = MockYoutubeApi::new()
            .with_videos("c2", vec![make_video("b", "c2", Some("2024-02-01"))]);
        let store = LaggingStore {
            inner: MockStore::with_feeds(vec![make_feed("Tech", &[("c1", "Ch1")])]),
            stale: Mutex::new(None),
        };
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");

        // Act
        session.add_channel(ChannelRef::new("c2", "Ch2")).await;

        // Assert
        let ids: Vec<&str> = session
            .state()
            .channels()
            .iter()
            .map(|c| c.channel_id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert_eq!(session.state().phase(), LoadPhase::VideosReady);
        assert_eq!(session.state().videos().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_read_after_image_update_uses_written_image() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = LaggingStore {
            inner: MockStore::with_feeds(vec![make_feed("Tech", &[("c1", "Ch1")])]),
            stale: Mutex::new(None),
        };
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech");
        let update = FeedUpdate {
            image: Some(String::from("new.png")),
            ..FeedUpdate::default()
        };

        // Act
        let nav = session.update(&update).await;

        // Assert
        assert_eq!(nav, Some(Navigation::Stay));
        assert_eq!(session.state().feed().unwrap().image, "new.png");
        assert_eq!(session.state().phase(), LoadPhase::VideosReady);
    }

    #[tokio::test]
    async fn test_stale_read_after_renaming_empty_feed_uses_new_name() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = LaggingStore {
            inner: MockStore::with_feeds(vec![make_feed("A", &[])]),
            stale: Mutex::new(None),
        };
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "A");
        let update = FeedUpdate {
            name: Some(String::from("B")),
            ..FeedUpdate::default()
        };

        // Act
        let nav = session.update(&update).await;

        // Assert
        assert_eq!(nav, Some(Navigation::Feed(String::from("B"))));
        assert_eq!(session.state().feed().unwrap().name, "B");
        assert_eq!(session.state().phase(), LoadPhase::NoChannels);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_is_waited_before_reload() {
        // Arrange
        let api = MockYoutubeApi::new();
        let store = MockStore::with_feeds(vec![make_feed("Tech", &[])]);
        let mut session = FeedSession::new(Aggregator::new(&api, &store), "u1", "Tech")
            .settle_delay(Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        // Act
        session.add_channel(ChannelRef::new("c1", "Ch1")).await;

        // Assert
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(session.state().channels().len(), 1);
    }
}
