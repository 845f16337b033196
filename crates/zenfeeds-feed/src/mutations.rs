//! Feed create/update/delete against the user record.
//!
//! Update and delete read the whole record, change it in memory and
//! write it back. Concurrent writers are not reconciled: the last write
//! wins. Create uses the store's append primitive instead.

use anyhow::{Context, Result, bail};
use tracing::instrument;
use zenfeeds_db::{ChannelRef, Feed, UserRecord};

use crate::names::{normalize_feed_name, same_feed_name};
use crate::store::LocalDocumentStore;

/// New values for an existing feed. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New cover image URL.
    pub image: Option<String>,
    /// Replacement channel membership.
    pub channels: Option<Vec<ChannelRef>>,
    /// Channel IDs to drop after `channels` is applied.
    pub remove_channel_ids: Vec<String>,
}

impl FeedUpdate {
    /// Returns `true` when applying this update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.channels.is_none()
            && self.remove_channel_ids.is_empty()
    }
}

/// Creates an empty feed named `name`.
///
/// # Errors
///
/// Returns an error if the name is empty, a feed with the same name
/// already exists, or the store fails.
#[instrument(skip_all, fields(feed = name))]
pub async fn create_feed(
    store: &(impl LocalDocumentStore + Sync),
    uid: &str,
    name: &str,
    image: &str,
) -> Result<Feed> {
    let name = normalize_feed_name(name);
    if name.is_empty() {
        bail!("feed name must not be empty");
    }

    let record = store
        .read_record(uid)
        .await
        .context("failed to read user record")?;
    if record.is_some_and(|r| r.feeds.iter().any(|f| same_feed_name(&f.name, &name))) {
        bail!("feed already exists: {name}");
    }

    let feed = Feed::new(name, image.trim());
    store
        .append_feed(uid, &feed)
        .await
        .context("failed to append feed")?;

    tracing::debug!(uid, "feed created");
    Ok(feed)
}

/// Deletes feed `name`. Returns `false` when there was no such feed.
///
/// # Errors
///
/// Returns an error if the store read or write fails.
#[instrument(skip_all, fields(feed = name))]
pub async fn delete_feed(
    store: &(impl LocalDocumentStore + Sync),
    uid: &str,
    name: &str,
) -> Result<bool> {
    let Some(mut record) = store
        .read_record(uid)
        .await
        .context("failed to read user record")?
    else {
        return Ok(false);
    };

    let before = record.feeds.len();
    record.feeds.retain(|f| !same_feed_name(&f.name, name));
    if record.feeds.len() == before {
        return Ok(false);
    }

    store
        .write_record(uid, &record)
        .await
        .context("failed to write user record")?;

    tracing::debug!(uid, "feed deleted");
    Ok(true)
}

/// Applies `update` to feed `name` and returns the feed as written.
///
/// # Errors
///
/// Returns an error if the feed does not exist, the new name is empty or
/// taken by another feed, or the store fails.
#[instrument(skip_all, fields(feed = name))]
pub async fn update_feed(
    store: &(impl LocalDocumentStore + Sync),
    uid: &str,
    name: &str,
    update: &FeedUpdate,
) -> Result<Feed> {
    let mut record = read_existing(store, uid).await?;

    let new_name = match &update.name {
        Some(new_name) => {
            let new_name = normalize_feed_name(new_name);
            if new_name.is_empty() {
                bail!("feed name must not be empty");
            }
            let taken = record
                .feeds
                .iter()
                .any(|f| same_feed_name(&f.name, &new_name) && !same_feed_name(&f.name, name));
            if taken {
                bail!("feed already exists: {new_name}");
            }
            Some(new_name)
        }
        None => None,
    };

    let feed = find_feed_mut(&mut record, name)?;
    if let Some(new_name) = new_name {
        feed.name = new_name;
    }
    if let Some(image) = &update.image {
        image.trim().clone_into(&mut feed.image);
    }
    if let Some(channels) = &update.channels {
        feed.channels.clone_from(channels);
    }
    if !update.remove_channel_ids.is_empty() {
        feed.channels
            .retain(|c| !update.remove_channel_ids.contains(&c.channel_id));
    }
    let updated = feed.clone();

    store
        .write_record(uid, &record)
        .await
        .context("failed to write user record")?;

    tracing::debug!(uid, new_name = %updated.name, channels = updated.channels.len(), "feed updated");
    Ok(updated)
}

/// Adds `channel` to feed `name` and returns the feed as written.
///
/// A channel already in the feed is left as is and nothing is written.
///
/// # Errors
///
/// Returns an error if the feed does not exist or the store fails.
#[instrument(skip_all, fields(feed = name, channel_id = %channel.channel_id))]
pub async fn add_channel(
    store: &(impl LocalDocumentStore + Sync),
    uid: &str,
    name: &str,
    channel: ChannelRef,
) -> Result<Feed> {
    let mut record = read_existing(store, uid).await?;
    let feed = find_feed_mut(&mut record, name)?;

    if feed
        .channels
        .iter()
        .any(|c| c.channel_id == channel.channel_id)
    {
        tracing::debug!("channel already in feed");
        return Ok(feed.clone());
    }

    feed.channels.push(channel);
    let updated = feed.clone();

    store
        .write_record(uid, &record)
        .await
        .context("failed to write user record")?;

    tracing::debug!(channels = updated.channels.len(), "channel added");
    Ok(updated)
}

async fn read_existing(store: &(impl LocalDocumentStore + Sync), uid: &str) -> Result<UserRecord> {
    store
        .read_record(uid)
        .await
        .context("failed to read user record")?
        .with_context(|| format!("no feeds stored for user {uid}"))
}

fn find_feed_mut<'r>(record: &'r mut UserRecord, name: &str) -> Result<&'r mut Feed> {
    record
        .feeds
        .iter_mut()
        .find(|f| same_feed_name(&f.name, name))
        .with_context(|| format!("feed not found: {name}"))
}
