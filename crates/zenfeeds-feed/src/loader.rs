//! Fetches one detail record per channel.

use std::collections::HashMap;

use futures::{StreamExt, stream};
use tracing::instrument;
use zenfeeds_api::youtube::{ChannelDetails, LocalYoutubeApi};
use zenfeeds_db::ChannelRef;

/// Loads channel details with at most `max_concurrency` requests in flight.
///
/// A failed channel is logged and left out of the map.
#[instrument(skip_all, fields(channels = channels.len()))]
pub async fn load_channel_details(
    api: &(impl LocalYoutubeApi + Sync),
    channels: &[ChannelRef],
    max_concurrency: usize,
) -> HashMap<String, ChannelDetails> {
    let results: Vec<(&str, anyhow::Result<ChannelDetails>)> = stream::iter(channels)
        .map(|channel| async move {
            let id = channel.channel_id.as_str();
            (id, api.channel_details(id).await)
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    let mut details = HashMap::with_capacity(results.len());
    for (channel_id, result) in results {
        match result {
            Ok(detail) => {
                details.insert(String::from(channel_id), detail);
            }
            Err(e) => {
                tracing::warn!(channel_id, error = %format!("{e:#}"), "failed to load channel details");
            }
        }
    }

    tracing::debug!(loaded = details.len(), "channel details loaded");
    details
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::Ordering;

    use super::*;
    use crate::test_support::MockYoutubeApi;

    #[tokio::test]
    async fn test_load_details_for_every_channel() {
        // Arrange
        let api = MockYoutubeApi::new();
        let channels = vec![ChannelRef::new("c1", "Ch1"), ChannelRef::new("c2", "Ch2")];

        // Act
        let details = load_channel_details(&api, &channels, 4).await;

        // Assert
        assert_eq!(details.len(), 2);
        assert_eq!(details["c1"].snippet.title, "Title of c1");
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_channel_is_skipped() {
        // Arrange
        let api = MockYoutubeApi::new().failing_details("c2");
        let channels = vec![
            ChannelRef::new("c1", "Ch1"),
            ChannelRef::new("c2", "Ch2"),
            ChannelRef::new("c3", "Ch3"),
        ];

        // Act
        let details = load_channel_details(&api, &channels, 1).await;

        // Assert
        assert_eq!(details.len(), 2);
        assert!(details.contains_key("c1"));
        assert!(!details.contains_key("c2"));
        assert!(details.contains_key("c3"));
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_loads() {
        // Arrange
        let api = MockYoutubeApi::new();
        let channels = vec![ChannelRef::new("c1", "Ch1")];

        // Act
        let details = load_channel_details(&api, &channels, 0).await;

        // Assert
        assert_eq!(details.len(), 1);
    }
}
