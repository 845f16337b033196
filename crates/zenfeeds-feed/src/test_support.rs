//! Shared fakes for core tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, bail};
use zenfeeds_api::youtube::{
    ChannelDetails, ChannelSearchResult, ChannelSnippet, LocalYoutubeApi, Thumbnails, Video,
    VideoId, VideoSnippet,
};
use zenfeeds_db::{ChannelRef, Feed, UserRecord};

use crate::store::{LocalDocumentStore, SqliteStore};

/// Mock provider with per-channel canned responses and call counters.
#[derive(Default)]
pub struct MockYoutubeApi {
    pub videos: HashMap<String, Vec<Video>>,
    pub failing_details: HashSet<String>,
    pub failing_videos: HashSet<String>,
    pub detail_calls: AtomicU32,
    pub video_calls: AtomicU32,
    pub search_calls: AtomicU32,
}

impl MockYoutubeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(mut self, channel_id: &str, videos: Vec<Video>) -> Self {
        self.videos.insert(String::from(channel_id), videos);
        self
    }

    pub fn failing_details(mut self, channel_id: &str) -> Self {
        self.failing_details.insert(String::from(channel_id));
        self
    }

    pub fn failing_videos(mut self, channel_id: &str) -> Self {
        self.failing_videos.insert(String::from(channel_id));
        self
    }

    pub fn total_calls(&self) -> u32 {
        self.detail_calls.load(Ordering::SeqCst)
            + self.video_calls.load(Ordering::SeqCst)
            + self.search_calls.load(Ordering::SeqCst)
    }
}

impl LocalYoutubeApi for MockYoutubeApi {
    async fn channel_details(&self, channel_id: &str) -> Result<ChannelDetails> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.contains(channel_id) {
            bail!("YouTube API error (HTTP 500 Internal Server Error): backend error");
        }
        Ok(make_details(channel_id, &format!("Title of {channel_id}")))
    }

    async fn channel_videos(&self, channel_id: &str) -> Result<Vec<Video>> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_videos.contains(channel_id) {
            bail!("YouTube API error (HTTP 403 Forbidden): quota exceeded");
        }
        Ok(self.videos.get(channel_id).cloned().unwrap_or_default())
    }

    async fn search_channels(&self, _query: &str) -> Result<Vec<ChannelSearchResult>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![])
    }
}

/// In-memory store with a write counter and an optional read failure.
#[derive(Default)]
pub struct MockStore {
    pub record: Mutex<Option<UserRecord>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub writes: AtomicU32,
}

impl MockStore {
    pub fn with_feeds(feeds: Vec<Feed>) -> Self {
        Self {
            record: Mutex::new(Some(UserRecord { feeds })),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Option<UserRecord> {
        self.record.lock().unwrap().clone()
    }
}

impl LocalDocumentStore for MockStore {
    async fn read_record(&self, _uid: &str) -> Result<Option<UserRecord>> {
        if self.fail_reads {
            bail!("store unreachable");
        }
        Ok(self.record.lock().unwrap().clone())
    }

    async fn write_record(&self, _uid: &str, record: &UserRecord) -> Result<()> {
        if self.fail_writes {
            bail!("permission denied");
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    async fn append_feed(&self, _uid: &str, feed: &Feed) -> Result<()> {
        if self.fail_writes {
            bail!("permission denied");
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.record
            .lock()
            .unwrap()
            .get_or_insert_with(UserRecord::default)
            .feeds
            .push(feed.clone());
        Ok(())
    }
}

/// Opens a fresh `SQLite` store in a temp dir.
pub fn sqlite_store() -> (SqliteStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(Some(&dir.path().to_path_buf())).unwrap();
    (store, dir)
}

pub fn make_details(channel_id: &str, title: &str) -> ChannelDetails {
    ChannelDetails {
        id: String::from(channel_id),
        snippet: ChannelSnippet {
            title: String::from(title),
            description: String::new(),
            custom_url: None,
            published_at: None,
            thumbnails: Thumbnails::default(),
        },
        statistics: None,
    }
}

pub fn make_video(id: &str, channel_id: &str, published_at: Option<&str>) -> Video {
    Video {
        id: VideoId::Plain(String::from(id)),
        snippet: Some(VideoSnippet {
            published_at: published_at.map(String::from),
            channel_id: Some(String::from(channel_id)),
            title: format!("Video {id}"),
            ..VideoSnippet::default()
        }),
    }
}

pub fn make_feed(name: &str, channels: &[(&str, &str)]) -> Feed {
    Feed {
        name: String::from(name),
        image: String::new(),
        channels: channels
            .iter()
            .map(|(id, title)| ChannelRef::new(*id, *title))
            .collect(),
    }
}
