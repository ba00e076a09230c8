//! Schema registry lookups
//!
//! Resolves the latest registered schema version for a subject over the
//! registry's REST surface. The returned definition governs every value the
//! publisher encodes; its id is embedded in the wire framing so consumers can
//! resolve the writer schema.

use crate::config::RegistryConfig;
use crate::error::{IngestError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Subject that carries the value schema for `topic`.
pub fn value_subject(topic: &str) -> String {
    format!("{topic}-value")
}

/// Latest registered version of a subject's schema.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredSchema {
    pub subject: String,
    pub id: u32,
    pub version: u32,
    pub schema: String,
}

/// Client for the schema registry REST API
pub struct SchemaRegistryClient {
    http: Client,
    base_url: String,
}

impl SchemaRegistryClient {
    /// Create a new registry client
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                IngestError::config(format!("failed to build registry HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up the latest schema version registered for `subject`
    pub async fn latest_schema(&self, subject: &str) -> Result<RegisteredSchema> {
        let url = format!("{}/subjects/{}/versions/latest", self.base_url, subject);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::registry(subject, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::registry(
                subject,
                format!("registry answered {status}"),
            ));
        }

        response
            .json::<RegisteredSchema>()
            .await
            .map_err(|e| IngestError::registry(subject, format!("malformed response: {e}")))
    }
}
