//! Persistence for zenfeeds user records.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep one JSON document per
//! user. Writes replace the whole document; new feeds can also be
//! appended in a single statement without reading the record first.

mod connection;
mod migrations;
/// User record CRUD operations.
pub mod users;

#[allow(clippy::module_name_repetitions)]
pub use connection::open_db;
pub use users::{ChannelRef, Feed, UserRecord, append_feed, load_user_record, save_user_record};
