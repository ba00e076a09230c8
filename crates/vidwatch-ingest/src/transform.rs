//! Playlist-entry enrichment and summary construction

use crate::error::{IngestError, Result};
use crate::paginate::paginate;
use crate::youtube::{self, PlaylistItem, VideoDetail, YoutubeClient};
use futures::TryStreamExt;
use vidwatch_common::VideoSummary;

/// Outcome of enriching one playlist entry.
///
/// Shape problems are data, not control flow: the pipeline accumulates them
/// per identifier and keeps going, so one inconsistent video cannot hide the
/// rest of the playlist.
#[derive(Debug)]
pub enum EnrichOutcome {
    Summary(VideoSummary),
    Rejected { video_id: String, reason: String },
}

/// Maps a playlist entry to its video identifier and resolves the
/// corresponding detail record.
pub struct Enricher<'a> {
    youtube: &'a YoutubeClient,
    max_pages: u32,
}

impl<'a> Enricher<'a> {
    pub fn new(youtube: &'a YoutubeClient, max_pages: u32) -> Self {
        Self { youtube, max_pages }
    }

    /// Fetch the detail record for one playlist entry and reduce it to a
    /// summary.
    ///
    /// The detail collection is paginated like any other, but exactly one
    /// record is expected per identifier; zero or multiple matches signal an
    /// inconsistent upstream collection and are rejected, not dropped.
    pub async fn enrich(&self, item: PlaylistItem) -> Result<EnrichOutcome> {
        let video_id = item.content_details.video_id;
        let youtube = self.youtube;

        let fetch = {
            let video_id = video_id.clone();
            move |cursor: Option<String>| {
                let video_id = video_id.clone();
                async move { youtube.videos_page(&video_id, cursor.as_deref()).await }
            }
        };

        let details: Vec<VideoDetail> = paginate(youtube::VIDEOS_ENDPOINT, fetch, self.max_pages)
            .try_collect()
            .await?;

        match details.as_slice() {
            [detail] => match summarize(detail) {
                Ok(summary) => Ok(EnrichOutcome::Summary(summary)),
                Err(IngestError::DataShape { video_id, reason }) => {
                    Ok(EnrichOutcome::Rejected { video_id, reason })
                },
                Err(other) => Err(other),
            },
            [] => Ok(EnrichOutcome::Rejected {
                video_id,
                reason: "no detail record in the videos collection".to_string(),
            }),
            many => Ok(EnrichOutcome::Rejected {
                video_id,
                reason: format!("{} detail records for one identifier", many.len()),
            }),
        }
    }
}

/// Reduce a raw video detail payload to the publishable summary.
///
/// Absent counters read as zero; present counters must parse as integers.
pub fn summarize(video: &VideoDetail) -> Result<VideoSummary> {
    Ok(VideoSummary {
        video_id: video.id.clone(),
        title: video.snippet.title.clone(),
        views: counter(&video.id, "viewCount", video.statistics.view_count.as_deref())?,
        likes: counter(&video.id, "likeCount", video.statistics.like_count.as_deref())?,
        comments: counter(
            &video.id,
            "commentCount",
            video.statistics.comment_count.as_deref(),
        )?,
    })
}

fn counter(video_id: &str, name: &str, raw: Option<&str>) -> Result<i64> {
    match raw {
        None => Ok(0),
        Some(value) => value.parse::<i64>().map_err(|_| {
            IngestError::data_shape(video_id, format!("{name} is not an integer: {value:?}"))
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::youtube::{Snippet, Statistics};

    fn detail(id: &str, title: &str, statistics: Statistics) -> VideoDetail {
        VideoDetail {
            id: id.to_string(),
            snippet: Snippet {
                title: title.to_string(),
            },
            statistics,
        }
    }

    #[test]
    fn test_missing_statistics_default_to_zero() {
        let summary = summarize(&detail("v1", "a title", Statistics::default())).unwrap();
        assert_eq!(summary.video_id, "v1");
        assert_eq!(summary.title, "a title");
        assert_eq!(summary.views, 0);
        assert_eq!(summary.likes, 0);
        assert_eq!(summary.comments, 0);
    }

    #[test]
    fn test_partial_statistics_parse_with_defaults() {
        let stats = Statistics {
            view_count: Some("10".to_string()),
            like_count: Some("2".to_string()),
            comment_count: None,
        };

        let summary = summarize(&detail("v1", "t", stats)).unwrap();
        assert_eq!(summary.views, 10);
        assert_eq!(summary.likes, 2);
        assert_eq!(summary.comments, 0);
    }

    #[test]
    fn test_non_integer_counter_is_a_shape_error() {
        let stats = Statistics {
            view_count: Some("lots".to_string()),
            like_count: None,
            comment_count: None,
        };

        match summarize(&detail("v1", "t", stats)) {
            Err(IngestError::DataShape { video_id, reason }) => {
                assert_eq!(video_id, "v1");
                assert!(reason.contains("viewCount"));
            },
            other => panic!("expected shape error, got {other:?}"),
        }
    }
}
