//! User record persistence.
//!
//! Each user owns one JSON document shaped as
//! `{"feeds":[{"name","image","channels":[{"channelId","channelTitle"}]}]}`.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Whole persisted record of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Feeds in creation order.
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

/// A user-named collection of channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Display name, unique per user.
    pub name: String,
    /// Cover image URL (may be empty).
    #[serde(default)]
    pub image: String,
    /// Member channels in insertion order.
    #[serde(default)]
    pub channels: Vec<ChannelRef>,
}

impl Feed {
    /// Creates an empty feed.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            channels: Vec::new(),
        }
    }
}

/// Channel membership entry of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRef {
    /// Provider channel ID.
    pub channel_id: String,
    /// Channel title at the time it was added.
    #[serde(default)]
    pub channel_title: String,
}

impl ChannelRef {
    /// Creates a membership entry.
    pub fn new(channel_id: impl Into<String>, channel_title: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_title: channel_title.into(),
        }
    }
}

/// Loads the record for `uid`, or `None` when the user has none.
///
/// # Errors
///
/// Returns an error if the query fails or the stored document is not valid JSON.
pub fn load_user_record(conn: &Connection, uid: &str) -> Result<Option<UserRecord>> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM users WHERE uid = ?1",
            rusqlite::params![uid],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("failed to query user record {uid}"))?;

    let Some(document) = document else {
        return Ok(None);
    };

    let record: UserRecord = serde_json::from_str(&document)
        .with_context(|| format!("failed to decode user record {uid}"))?;
    Ok(Some(record))
}

/// Replaces the whole record for `uid`, creating it when absent.
///
/// # Errors
///
/// Returns an error if serialization or the database write fails.
pub fn save_user_record(conn: &Connection, uid: &str, record: &UserRecord) -> Result<()> {
    let document = serde_json::to_string(record).context("failed to encode user record")?;

    conn.execute(
        "INSERT INTO users (uid, document, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(uid) DO UPDATE SET
            document = excluded.document,
            updated_at = excluded.updated_at",
        rusqlite::params![uid, document],
    )
    .with_context(|| format!("failed to save user record {uid}"))?;

    tracing::debug!(uid, feeds = record.feeds.len(), "user record saved");
    Ok(())
}

/// Appends `feed` to the record's `feeds` array in one statement.
///
/// Creates the record when absent. The existing document is never read
/// back into the process, so concurrent appends do not drop each other.
///
/// # Errors
///
/// Returns an error if serialization or the database write fails.
pub fn append_feed(conn: &Connection, uid: &str, feed: &Feed) -> Result<()> {
    let element = serde_json::to_string(feed).context("failed to encode feed")?;

    conn.execute(
        "INSERT INTO users (uid, document, updated_at)
         VALUES (?1, json_object('feeds', json_array(json(?2))), datetime('now'))
         ON CONFLICT(uid) DO UPDATE SET
            document = json_insert(
                CASE WHEN json_type(users.document, '$.feeds') = 'array'
                     THEN users.document
                     ELSE json_set(users.document, '$.feeds', json('[]'))
                END,
                '$.feeds[#]',
                json(?2)
            ),
            updated_at = excluded.updated_at",
        rusqlite::params![uid, element],
    )
    .with_context(|| format!("failed to append feed {} for {uid}", feed.name))?;

    tracing::debug!(uid, feed = %feed.name, "feed appended");
    Ok(())
}
