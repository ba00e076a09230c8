//! Schema-governed serialization and publication to the broker sink
//!
//! Values are framed the way registry-aware consumers expect: a zero magic
//! byte, the big-endian schema id, then the Avro-encoded record. Delivery is
//! asynchronous; every enqueued record keeps its delivery future, and
//! [`Publisher::flush`] turns the outstanding set into a per-key report
//! instead of trusting a fire-and-forget callback.

use crate::config::KafkaConfig;
use crate::error::{IngestError, Result};
use crate::registry::RegisteredSchema;
use apache_avro::Schema;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::{debug, warn};
use vidwatch_common::VideoSummary;

/// A delivery the sink reported (or never confirmed) as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub key: String,
    pub reason: String,
}

/// Per-key outcome of all deliveries enqueued during a run.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

/// Encode a summary against the registered schema, framed for the registry.
///
/// Fails when the record does not conform to the schema.
pub fn encode_summary(
    schema: &Schema,
    schema_id: u32,
    summary: &VideoSummary,
) -> std::result::Result<Vec<u8>, apache_avro::Error> {
    let value = apache_avro::to_value(summary)?;
    let body = apache_avro::to_avro_datum(schema, value)?;

    let mut framed = Vec::with_capacity(body.len() + 5);
    framed.push(0u8);
    framed.extend_from_slice(&schema_id.to_be_bytes());
    framed.extend_from_slice(&body);

    Ok(framed)
}

/// Publishes schema-encoded summaries and tracks their delivery outcomes.
///
/// The producer partitions by key, so per-key delivery order follows publish
/// order; no ordering is guaranteed across distinct keys.
pub struct Publisher {
    producer: FutureProducer,
    topic: String,
    schema: Schema,
    schema_id: u32,
    pending: Vec<(String, DeliveryFuture)>,
}

impl Publisher {
    /// Create a publisher for `topic` governed by the registered schema
    pub fn new(kafka: &KafkaConfig, registered: &RegisteredSchema) -> Result<Self> {
        let schema = Schema::parse_str(&registered.schema).map_err(|e| {
            IngestError::registry(
                &registered.subject,
                format!("unparseable schema definition: {e}"),
            )
        })?;

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &kafka.bootstrap_servers)
            .set("message.timeout.ms", kafka.message_timeout_ms.to_string())
            .set("enable.idempotence", "true")
            .create()?;

        Ok(Self {
            producer,
            topic: kafka.topic.clone(),
            schema,
            schema_id: registered.id,
            pending: Vec::new(),
        })
    }

    /// Encode and enqueue one summary, keyed by its video identifier.
    ///
    /// Returns as soon as the record is handed to the sink; the delivery
    /// outcome is collected later by [`Publisher::flush`].
    pub fn publish(&mut self, summary: &VideoSummary) -> Result<()> {
        let key = summary.video_id.clone();

        let payload = encode_summary(&self.schema, self.schema_id, summary).map_err(|source| {
            IngestError::Serialization {
                key: key.clone(),
                source,
            }
        })?;

        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);
        let enqueued = self
            .producer
            .send_result(record)
            .map_err(|(source, _record)| source);

        match enqueued {
            Ok(delivery) => {
                debug!(key = %key, "record enqueued");
                self.pending.push((key, delivery));
                Ok(())
            },
            Err(source) => Err(IngestError::Publish { key, source }),
        }
    }

    /// Number of deliveries not yet collected.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Wait (bounded) for every outstanding delivery and report per key.
    ///
    /// Records still unacknowledged when the window elapses are reported as
    /// failures rather than awaited indefinitely.
    pub async fn flush(&mut self, timeout: Duration) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if self.pending.is_empty() {
            return report;
        }

        debug!(outstanding = self.pending.len(), "collecting delivery acknowledgments");
        let deadline = tokio::time::Instant::now() + timeout;

        for (key, delivery) in self.pending.drain(..) {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, delivery).await {
                Ok(Ok(Ok((partition, offset)))) => {
                    debug!(key = %key, partition, offset, "delivery confirmed");
                    report.delivered += 1;
                },
                Ok(Ok(Err((error, _message)))) => {
                    warn!(key = %key, error = %error, "delivery failed");
                    report.failures.push(DeliveryFailure {
                        key,
                        reason: error.to_string(),
                    });
                },
                Ok(Err(_cancelled)) => {
                    report.failures.push(DeliveryFailure {
                        key,
                        reason: "delivery result channel dropped".to_string(),
                    });
                },
                Err(_elapsed) => {
                    report.failures.push(DeliveryFailure {
                        key,
                        reason: format!(
                            "no acknowledgment within the {}s flush window",
                            timeout.as_secs()
                        ),
                    });
                },
            }
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use apache_avro::types::Value;

    const VALUE_SCHEMA: &str = r#"{
        "type": "record",
        "name": "VideoSummary",
        "fields": [
            {"name": "video_id", "type": "string"},
            {"name": "title", "type": "string"},
            {"name": "views", "type": "long"},
            {"name": "likes", "type": "long"},
            {"name": "comments", "type": "long"}
        ]
    }"#;

    fn summary() -> VideoSummary {
        VideoSummary {
            video_id: "abc123".to_string(),
            title: "a title".to_string(),
            views: 10,
            likes: 2,
            comments: 0,
        }
    }

    #[test]
    fn test_encoded_value_carries_registry_framing() {
        let schema = Schema::parse_str(VALUE_SCHEMA).unwrap();
        let framed = encode_summary(&schema, 7, &summary()).unwrap();

        assert_eq!(framed[0], 0, "magic byte");
        assert_eq!(u32::from_be_bytes([framed[1], framed[2], framed[3], framed[4]]), 7);
        assert!(framed.len() > 5);

        let decoded =
            apache_avro::from_avro_datum(&schema, &mut &framed[5..], None).unwrap();
        match decoded {
            Value::Record(fields) => {
                assert_eq!(
                    fields[0],
                    ("video_id".to_string(), Value::String("abc123".to_string()))
                );
                assert_eq!(fields[2], ("views".to_string(), Value::Long(10)));
            },
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_nonconforming_record_is_rejected() {
        // Registered schema expects a string where the record carries a long.
        let incompatible = r#"{
            "type": "record",
            "name": "VideoSummary",
            "fields": [
                {"name": "video_id", "type": "string"},
                {"name": "title", "type": "string"},
                {"name": "views", "type": "string"},
                {"name": "likes", "type": "long"},
                {"name": "comments", "type": "long"}
            ]
        }"#;

        let schema = Schema::parse_str(incompatible).unwrap();
        assert!(encode_summary(&schema, 7, &summary()).is_err());
    }
}
