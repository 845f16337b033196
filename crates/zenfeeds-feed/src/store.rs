//! Document-store collaborator and its `SQLite` adapter.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tokio::sync::Mutex;
use zenfeeds_db::{Feed, UserRecord};

/// Per-user record store with whole-document semantics.
#[trait_variant::make(DocumentStore: Send)]
pub trait LocalDocumentStore {
    /// Reads the full record of `uid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the record is corrupt.
    async fn read_record(&self, uid: &str) -> Result<Option<UserRecord>>;

    /// Overwrites the full record of `uid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn write_record(&self, uid: &str, record: &UserRecord) -> Result<()>;

    /// Appends one feed to the record of `uid` without reading it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn append_feed(&self, uid: &str, feed: &Feed) -> Result<()>;
}

/// `SQLite`-backed store. Access to the connection is serialised.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wraps an already migrated connection.
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens the database under `dir` (or the default data directory).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&PathBuf>) -> Result<Self> {
        let conn = zenfeeds_db::open_db(dir).context("failed to open feed store")?;
        Ok(Self::new(conn))
    }
}

impl LocalDocumentStore for SqliteStore {
    async fn read_record(&self, uid: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock().await;
        zenfeeds_db::load_user_record(&conn, uid)
    }

    async fn write_record(&self, uid: &str, record: &UserRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        zenfeeds_db::save_user_record(&conn, uid, record)
    }

    async fn append_feed(&self, uid: &str, feed: &Feed) -> Result<()> {
        let conn = self.conn.lock().await;
        zenfeeds_db::append_feed(&conn, uid, feed)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use zenfeeds_db::ChannelRef;

    use super::*;

    #[tokio::test]
    async fn test_sqlite_store_read_after_write() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(Some(&dir.path().to_path_buf())).unwrap();
        let record = UserRecord {
            feeds: vec![Feed {
                name: String::from("Tech"),
                image: String::new(),
                channels: vec![ChannelRef::new("c1", "Ch1")],
            }],
        };

        // Act
        store.write_record("u1", &record).await.unwrap();
        let loaded = store.read_record("u1").await.unwrap();

        // Assert
        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn test_sqlite_store_append_then_read() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(Some(&dir.path().to_path_buf())).unwrap();

        // Act
        store.append_feed("u1", &Feed::new("A", "")).await.unwrap();
        store.append_feed("u1", &Feed::new("B", "")).await.unwrap();
        let loaded = store.read_record("u1").await.unwrap().unwrap();

        // Assert
        let names: Vec<&str> = loaded.feeds.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
