//! Typed payloads for the two collection endpoints
//!
//! The source is unversioned JSON, so absence rules are encoded here rather
//! than left to key lookups deep in transformation code: a page without an
//! `items` field is an empty page, a missing `statistics` mapping means all
//! counters are zero, and counters arrive as decimal strings.

use crate::paginate::Page;
use serde::Deserialize;

/// One page of the `playlistItems` collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

impl From<PlaylistItemsPage> for Page<PlaylistItem> {
    fn from(page: PlaylistItemsPage) -> Self {
        Page {
            items: page.items,
            next_page_token: page.next_page_token,
        }
    }
}

/// One entry of a playlist; carries the contained video identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub content_details: ContentDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    pub video_id: String,
}

/// One page of the `videos` collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListPage {
    #[serde(default)]
    pub items: Vec<VideoDetail>,
    pub next_page_token: Option<String>,
}

impl From<VideoListPage> for Page<VideoDetail> {
    fn from(page: VideoListPage) -> Self {
        Page {
            items: page.items,
            next_page_token: page.next_page_token,
        }
    }
}

/// Raw per-video payload with title and engagement counters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub id: String,
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snippet {
    pub title: String,
}

/// Engagement counters as reported by the API: decimal strings, each
/// possibly absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_page_without_items_field_is_empty() {
        let page: PlaylistItemsPage =
            serde_json::from_str(r#"{"nextPageToken": "tok"}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_video_detail_without_statistics_mapping() {
        let detail: VideoDetail = serde_json::from_str(
            r#"{"id": "v1", "snippet": {"title": "t"}}"#,
        )
        .unwrap();
        assert_eq!(detail.id, "v1");
        assert!(detail.statistics.view_count.is_none());
    }

    #[test]
    fn test_video_detail_counters_stay_raw_strings() {
        let detail: VideoDetail = serde_json::from_str(
            r#"{
                "id": "v1",
                "snippet": {"title": "t"},
                "statistics": {"viewCount": "10", "likeCount": "2"}
            }"#,
        )
        .unwrap();
        assert_eq!(detail.statistics.view_count.as_deref(), Some("10"));
        assert_eq!(detail.statistics.like_count.as_deref(), Some("2"));
        assert!(detail.statistics.comment_count.is_none());
    }

    #[test]
    fn test_playlist_item_requires_video_id() {
        let result: Result<PlaylistItem, _> =
            serde_json::from_str(r#"{"contentDetails": {}}"#);
        assert!(result.is_err());
    }
}
