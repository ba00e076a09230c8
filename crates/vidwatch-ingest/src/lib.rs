//! Vidwatch Ingest Library
//!
//! Single-pass pipeline that walks every entry of a YouTube playlist,
//! enriches each entry with per-video statistics, and publishes one
//! Avro-encoded summary per video to a Kafka topic.
//!
//! # Components
//!
//! - [`paginate`]: cursor-following traversal over a paginated collection
//! - [`youtube`]: typed payloads and page fetches for the two source endpoints
//! - [`transform`]: playlist-entry enrichment and summary construction
//! - [`registry`] / [`publish`]: schema lookup, Avro encoding, and
//!   delivery-tracked publication to the broker
//! - [`pipeline`]: orchestration and the final run report
//!
//! # Example
//!
//! ```no_run
//! use vidwatch_ingest::config::AppConfig;
//! use vidwatch_ingest::pipeline::Pipeline;
//! use vidwatch_ingest::publish::Publisher;
//! use vidwatch_ingest::registry::{value_subject, SchemaRegistryClient};
//! use vidwatch_ingest::youtube::YoutubeClient;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let registry = SchemaRegistryClient::new(&config.registry)?;
//!     let schema = registry
//!         .latest_schema(&value_subject(&config.kafka.topic))
//!         .await?;
//!     let pipeline = Pipeline::new(
//!         YoutubeClient::new(&config.youtube)?,
//!         Publisher::new(&config.kafka, &schema)?,
//!         &config,
//!         CancellationToken::new(),
//!     );
//!     let report = pipeline.run().await?;
//!     assert!(report.is_success());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod paginate;
pub mod pipeline;
pub mod publish;
pub mod registry;
pub mod transform;
pub mod youtube;

// Re-export commonly used types
pub use error::{IngestError, Result};
