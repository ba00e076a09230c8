//! YouTube Data API v3 access
//!
//! Typed payloads for the two collection endpoints the pipeline reads, and a
//! client that fetches one page at a time with bounded retry on transient
//! failures.

pub mod client;
pub mod types;

// Re-export main types
pub use client::YoutubeClient;
pub use types::{ContentDetails, PlaylistItem, Snippet, Statistics, VideoDetail};

/// Endpoint listing the entries of one playlist.
pub const PLAYLIST_ITEMS_ENDPOINT: &str = "playlistItems";

/// Endpoint listing video details, filtered by video id.
pub const VIDEOS_ENDPOINT: &str = "videos";
