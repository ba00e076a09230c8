//! Error types for the ingestion pipeline
//!
//! The variants follow the failure taxonomy of the pipeline: source fetch
//! and parse problems are fatal to the run, shape problems are accumulated
//! per video identifier, and delivery problems are collected at flush time.

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error type for the ingestion pipeline
#[derive(Error, Debug)]
pub enum IngestError {
    /// HTTP request against the paginated source failed after retries
    #[error("request to {endpoint} failed (cursor {cursor:?}): {source}")]
    SourceFetch {
        endpoint: &'static str,
        cursor: Option<String>,
        #[source]
        source: reqwest::Error,
    },

    /// Source answered with a body that does not match the documented shape
    #[error("unexpected {endpoint} response shape (cursor {cursor:?}): {source}")]
    SourceParse {
        endpoint: &'static str,
        cursor: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    /// Traversal kept receiving continuation cursors past the safety bound
    #[error("{endpoint} traversal exceeded the {limit}-page safety bound")]
    PageLimitExceeded { endpoint: &'static str, limit: u32 },

    /// Upstream collections are inconsistent for one video identifier
    #[error("inconsistent video data for {video_id}: {reason}")]
    DataShape { video_id: String, reason: String },

    /// Schema registry lookup failed or returned an unusable definition
    #[error("schema registry error for subject {subject}: {reason}")]
    SchemaRegistry { subject: String, reason: String },

    /// Record does not conform to the registered schema
    #[error("record for {key} does not conform to the registered schema: {source}")]
    Serialization {
        key: String,
        #[source]
        source: apache_avro::Error,
    },

    /// Record could not be handed to the broker sink
    #[error("failed to enqueue record for {key}: {source}")]
    Publish {
        key: String,
        #[source]
        source: rdkafka::error::KafkaError,
    },

    /// Kafka client error outside of a per-record publish
    #[error("Kafka client error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl IngestError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a data shape error for one video identifier
    pub fn data_shape(video_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataShape {
            video_id: video_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a schema registry error
    pub fn registry(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaRegistry {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}
