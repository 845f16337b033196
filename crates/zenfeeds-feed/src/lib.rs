//! Feed aggregation core for zenfeeds.
//!
//! Resolves a feed's channel membership from the user's stored record,
//! fetches channel details and recent videos from the video provider,
//! and merges them into one newest-first list. The load state shown to
//! the user is tracked by [`FeedViewState`], owned by a [`FeedSession`].

/// Video aggregation pass.
pub mod aggregator;
/// Identity collaborator.
pub mod identity;
/// Channel detail loading.
pub mod loader;
/// Feed create/update/delete operations.
pub mod mutations;
mod names;
/// Feed resolution against the stored user record.
pub mod resolver;
/// Per-view session owning the load state.
pub mod session;
/// Load-state machine.
pub mod state;
/// Document-store collaborator.
pub mod store;

pub use aggregator::{Aggregator, FeedVideo, PassEvent};
pub use identity::{Identity, UserIdentity};
pub use mutations::FeedUpdate;
pub use names::{normalize_feed_name, same_feed_name};
pub use resolver::{ResolvedFeed, resolve_feed};
pub use session::{FeedSession, Navigation};
pub use state::{FeedViewState, LoadPhase, RunId};
pub use store::{DocumentStore, LocalDocumentStore, SqliteStore};

#[cfg(test)]
mod test_support;
