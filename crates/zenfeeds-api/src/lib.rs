//! API client library for zenfeeds.
//!
//! Provides a client for the YouTube Data API v3, the video provider
//! behind every feed.

/// YouTube Data API client.
pub mod youtube;
