//! Looks up a feed by name and derives its channel mapping.

use std::collections::HashMap;

use tracing::instrument;
use zenfeeds_db::{ChannelRef, Feed};

use crate::names::same_feed_name;
use crate::store::LocalDocumentStore;

/// Outcome of resolving a feed.
///
/// An absent record, an absent feed and a store failure all resolve to
/// `feed: None` with no channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFeed {
    /// Feed metadata, when the feed exists.
    pub feed: Option<Feed>,
    /// Channel ID to title mapping, in member order.
    pub channels: Vec<ChannelRef>,
}

impl ResolvedFeed {
    /// Builds the resolution of an existing feed.
    #[must_use]
    pub fn from_feed(feed: Feed) -> Self {
        let channels = channel_map(&feed.channels);
        Self {
            feed: Some(feed),
            channels,
        }
    }

    /// Returns `true` when there is nothing to fetch.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }
}

/// Collapses a membership list into a channel mapping.
///
/// A repeated channel ID keeps its first position and takes the title of
/// its last occurrence.
#[must_use]
pub fn channel_map(members: &[ChannelRef]) -> Vec<ChannelRef> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(members.len());
    let mut mapping: Vec<ChannelRef> = Vec::with_capacity(members.len());

    for member in members {
        if let Some(&pos) = positions.get(member.channel_id.as_str()) {
            if let Some(existing) = mapping.get_mut(pos) {
                existing.channel_title.clone_from(&member.channel_title);
            }
        } else {
            positions.insert(member.channel_id.as_str(), mapping.len());
            mapping.push(member.clone());
        }
    }

    mapping
}

/// Resolves `name` in the record of `uid`.
///
/// Never fails: store errors are logged and resolve to an empty feed.
#[instrument(skip_all, fields(feed = name))]
pub async fn resolve_feed(
    store: &(impl LocalDocumentStore + Sync),
    uid: &str,
    name: &str,
) -> ResolvedFeed {
    let record = match store.read_record(uid).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!(uid, "no user record");
            return ResolvedFeed::default();
        }
        Err(e) => {
            tracing::warn!(uid, error = %format!("{e:#}"), "failed to read user record");
            return ResolvedFeed::default();
        }
    };

    let Some(feed) = record
        .feeds
        .into_iter()
        .find(|f| same_feed_name(&f.name, name))
    else {
        tracing::debug!(uid, "feed not found");
        return ResolvedFeed::default();
    };

    let resolved = ResolvedFeed::from_feed(feed);
    tracing::debug!(channels = resolved.channels.len(), "feed resolved");
    resolved
}
