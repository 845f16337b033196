//! Plain-text output of feeds, videos and search results.

use zenfeeds_api::youtube::{ChannelDetails, ChannelSearchResult};
use zenfeeds_db::{ChannelRef, Feed};
use zenfeeds_feed::{FeedVideo, FeedViewState, LoadPhase};

/// Prints every feed with its channel count.
pub fn render_feed_list(feeds: &[Feed]) {
    if feeds.is_empty() {
        tracing::info!("No feeds yet. Create one with `zenfeeds feeds create <NAME>`.");
        return;
    }

    tracing::info!("Feeds ({}):", feeds.len());
    for feed in feeds {
        tracing::info!("  {}\t{} channel(s)", feed.name, feed.channels.len());
    }
}

/// Prints the header and the body of a feed view.
pub fn render_feed(state: &FeedViewState) {
    let name = state.feed_name();
    tracing::info!("Feed: {name}");

    match state.phase() {
        LoadPhase::InitialLoad | LoadPhase::LoadingVideos => {
            tracing::info!("Loading...");
        }
        LoadPhase::NoChannels => {
            tracing::info!("{}", add_channel_hint(name));
        }
        LoadPhase::VideosReady => {
            tracing::info!("Channels ({}):", state.channels().len());
            for channel in state.channels() {
                let details = state.details().get(&channel.channel_id);
                tracing::info!("  {}", channel_line(channel, details));
            }

            let videos = state.videos();
            if videos.is_empty() {
                tracing::info!("No videos found.");
                return;
            }
            for video in videos {
                tracing::info!("{}", video_line(video));
            }
            tracing::info!("Total: {} videos", videos.len());
        }
    }
}

/// Prints channel search results.
pub fn render_search_results(results: &[ChannelSearchResult]) {
    if results.is_empty() {
        tracing::info!("No channels found.");
        return;
    }

    tracing::info!("Channel ID\t\t\tTitle");
    for result in results {
        tracing::info!(
            "{}\t{}",
            result.channel_id().unwrap_or("-"),
            result.title()
        );
    }
}

/// Call to action for a feed without channels.
#[must_use]
pub fn add_channel_hint(name: &str) -> String {
    format!(
        "No channels in this feed yet. Add one with `zenfeeds feeds add-channel {name:?} --channel-id <ID>`."
    )
}

/// Publish date shown for a video.
#[must_use]
pub fn published_label(video: &FeedVideo) -> String {
    video.published.map_or_else(
        || String::from("----------"),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Subscriber count shown for a channel, `-` when hidden or unknown.
#[must_use]
pub fn subscriber_label(details: Option<&ChannelDetails>) -> String {
    details
        .and_then(|d| d.statistics.as_ref())
        .filter(|s| !s.hidden_subscriber_count)
        .and_then(|s| s.subscriber_count.as_deref())
        .map_or_else(|| String::from("-"), |count| format!("{count} subscribers"))
}

/// One line of the channel list. Falls back to the stored title when the
/// details did not load.
fn channel_line(channel: &ChannelRef, details: Option<&ChannelDetails>) -> String {
    let title = details.map_or(channel.channel_title.as_str(), |d| d.snippet.title.as_str());
    let avatar = details
        .and_then(|d| d.snippet.thumbnails.best_url())
        .unwrap_or("-");
    format!(
        "{title}\t{}\t{}\t{avatar}",
        channel.channel_id,
        subscriber_label(details)
    )
}

/// One line of the video list.
fn video_line(video: &FeedVideo) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        published_label(video),
        video.channel_title(),
        video.video.title(),
        video.video.watch_url().as_deref().unwrap_or("-"),
    )
}
