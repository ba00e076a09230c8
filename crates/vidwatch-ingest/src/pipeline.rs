//! Pipeline orchestration
//!
//! One pass: walk the playlist, enrich every entry, publish every summary,
//! then flush and report. Detail fetches for independent videos run through a
//! bounded, order-preserving buffer, so per-key publish order matches
//! discovery order. A cancellation signal stops new fetches and publishes and
//! proceeds directly to the flush-and-report step.

use crate::config::AppConfig;
use crate::error::{IngestError, Result};
use crate::paginate::paginate;
use crate::publish::{DeliveryFailure, Publisher};
use crate::transform::{EnrichOutcome, Enricher};
use crate::youtube::{self, YoutubeClient};
use futures::TryStreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// One video identifier that could not be reduced to a publishable summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeIssue {
    pub video_id: String,
    pub reason: String,
}

/// Outcome of a full ingestion pass.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Playlist entries that reached the enrichment step.
    pub discovered: usize,

    /// Records handed to the sink.
    pub published: usize,

    /// Records with confirmed delivery.
    pub delivered: usize,

    /// Identifiers rejected during enrichment, in discovery order.
    pub shape_errors: Vec<ShapeIssue>,

    /// Per-key delivery failures collected at flush time.
    pub delivery_failures: Vec<DeliveryFailure>,

    /// Whether the pass was cut short by a cancellation signal.
    pub cancelled: bool,
}

impl RunReport {
    /// A pass succeeds only when every discovered video was published with
    /// confirmed delivery.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.shape_errors.is_empty() && self.delivery_failures.is_empty()
    }
}

/// The ingestion pipeline: playlist traversal, enrichment, publication.
pub struct Pipeline {
    youtube: YoutubeClient,
    publisher: Publisher,
    playlist_id: String,
    max_pages: u32,
    fetch_concurrency: usize,
    flush_timeout: Duration,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(
        youtube: YoutubeClient,
        publisher: Publisher,
        config: &AppConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            youtube,
            publisher,
            playlist_id: config.youtube.playlist_id.clone(),
            max_pages: config.pipeline.max_pages,
            fetch_concurrency: config.pipeline.fetch_concurrency,
            flush_timeout: Duration::from_secs(config.pipeline.flush_timeout_secs),
            cancel,
        }
    }

    /// Run one full ingestion pass.
    ///
    /// Source and serialization failures abort the pass; outstanding
    /// deliveries are still flushed before the error propagates. Shape and
    /// delivery problems are collected into the report instead.
    pub async fn run(mut self) -> Result<RunReport> {
        info!(playlist_id = %self.playlist_id, "starting playlist ingestion pass");

        let mut report = RunReport::default();
        let mut fatal: Option<IngestError> = None;

        {
            let youtube = &self.youtube;
            let publisher = &mut self.publisher;
            let enricher = Enricher::new(youtube, self.max_pages);

            let playlist_id = self.playlist_id.clone();
            let fetch = move |cursor: Option<String>| {
                let playlist_id = playlist_id.clone();
                async move {
                    youtube
                        .playlist_items_page(&playlist_id, cursor.as_deref())
                        .await
                }
            };

            let outcomes = paginate(youtube::PLAYLIST_ITEMS_ENDPOINT, fetch, self.max_pages)
                .map_ok(|item| enricher.enrich(item))
                .try_buffered(self.fetch_concurrency);
            futures::pin_mut!(outcomes);

            loop {
                let next = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        warn!("cancellation requested, stopping new fetches and publishes");
                        report.cancelled = true;
                        break;
                    },
                    next = outcomes.try_next() => next,
                };

                match next {
                    Ok(Some(EnrichOutcome::Summary(summary))) => {
                        report.discovered += 1;
                        info!(
                            video_id = %summary.video_id,
                            title = %summary.title,
                            views = summary.views,
                            likes = summary.likes,
                            comments = summary.comments,
                            "summarized video"
                        );
                        match publisher.publish(&summary) {
                            Ok(()) => report.published += 1,
                            Err(e) => {
                                fatal = Some(e);
                                break;
                            },
                        }
                    },
                    Ok(Some(EnrichOutcome::Rejected { video_id, reason })) => {
                        report.discovered += 1;
                        error!(video_id = %video_id, reason = %reason, "video rejected during enrichment");
                        report.shape_errors.push(ShapeIssue { video_id, reason });
                    },
                    Ok(None) => break,
                    Err(e) => {
                        fatal = Some(e);
                        break;
                    },
                }
            }
        }

        let delivery = self.publisher.flush(self.flush_timeout).await;
        report.delivered = delivery.delivered;
        report.delivery_failures = delivery.failures;

        if let Some(error) = fatal {
            error!(error = %error, "ingestion pass aborted");
            return Err(error);
        }

        info!(
            discovered = report.discovered,
            published = report.published,
            delivered = report.delivered,
            rejected = report.shape_errors.len(),
            delivery_failures = report.delivery_failures.len(),
            "playlist ingestion pass finished"
        );

        Ok(report)
    }
}
