//! Shared domain types

use serde::{Deserialize, Serialize};

/// Normalized, publishable record derived from the raw video payloads.
///
/// Exactly one summary is published per video identifier discovered in the
/// watched playlist; the identifier doubles as the record key on the output
/// topic. Counters default to zero when the upstream statistics field is
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    /// Video identifier (unique key).
    pub video_id: String,

    /// Video title.
    pub title: String,

    /// View count.
    pub views: i64,

    /// Like count.
    pub likes: i64,

    /// Comment count.
    pub comments: i64,
}
