//! Configuration management
//!
//! The binary takes no flags; everything is supplied through the environment
//! (a `.env` file is honored). Required: `YOUTUBE_API_KEY` and
//! `YOUTUBE_PLAYLIST_ID`. Everything else falls back to the defaults below.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default base URL of the YouTube Data API v3.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default schema registry URL for local development.
pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:8081";

/// Default Kafka bootstrap servers for local development.
pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";

/// Default output topic.
pub const DEFAULT_TOPIC: &str = "youtube_videos";

/// Default librdkafka message timeout in milliseconds.
pub const DEFAULT_MESSAGE_TIMEOUT_MS: u64 = 5000;

/// Default HTTP timeout in seconds (source API and registry).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per page fetch.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between retry attempts in milliseconds.
/// Actual delay doubles per attempt (exponential backoff).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default upper bound on pages fetched per traversal.
pub const DEFAULT_MAX_PAGES: u32 = 512;

/// Default number of video-detail fetches in flight at once.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Default bounded wait for outstanding deliveries at shutdown, in seconds.
pub const DEFAULT_FLUSH_TIMEOUT_SECS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub youtube: YoutubeConfig,
    pub registry: RegistryConfig,
    pub kafka: KafkaConfig,
    pub pipeline: PipelineConfig,
}

/// Source API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    pub api_key: String,
    pub playlist_id: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Schema registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Broker sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub message_timeout_ms: u64,
}

/// Pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_pages: u32,
    pub fetch_concurrency: usize,
    pub flush_timeout_secs: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| IngestError::config(format!("{name} is not set")))
}

impl AppConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = AppConfig {
            youtube: YoutubeConfig {
                api_key: env_required("YOUTUBE_API_KEY")?,
                playlist_id: env_required("YOUTUBE_PLAYLIST_ID")?,
                base_url: std::env::var("YOUTUBE_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
                timeout_secs: env_or("VIDWATCH_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
                max_retries: env_or("VIDWATCH_MAX_RETRIES", DEFAULT_MAX_RETRIES),
                retry_delay_ms: env_or("VIDWATCH_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS),
            },
            registry: RegistryConfig {
                base_url: std::env::var("SCHEMA_REGISTRY_URL")
                    .unwrap_or_else(|_| DEFAULT_REGISTRY_URL.to_string()),
                timeout_secs: env_or("VIDWATCH_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            },
            kafka: KafkaConfig {
                bootstrap_servers: std::env::var("KAFKA_BOOTSTRAP_SERVERS")
                    .unwrap_or_else(|_| DEFAULT_BOOTSTRAP_SERVERS.to_string()),
                topic: std::env::var("KAFKA_TOPIC").unwrap_or_else(|_| DEFAULT_TOPIC.to_string()),
                message_timeout_ms: env_or("KAFKA_MESSAGE_TIMEOUT_MS", DEFAULT_MESSAGE_TIMEOUT_MS),
            },
            pipeline: PipelineConfig {
                max_pages: env_or("VIDWATCH_MAX_PAGES", DEFAULT_MAX_PAGES),
                fetch_concurrency: env_or("VIDWATCH_FETCH_CONCURRENCY", DEFAULT_FETCH_CONCURRENCY),
                flush_timeout_secs: env_or("VIDWATCH_FLUSH_TIMEOUT_SECS", DEFAULT_FLUSH_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.youtube.api_key.is_empty() {
            return Err(IngestError::config("YouTube API key cannot be empty"));
        }

        if self.youtube.playlist_id.is_empty() {
            return Err(IngestError::config("Playlist id cannot be empty"));
        }

        if self.youtube.base_url.is_empty() || self.registry.base_url.is_empty() {
            return Err(IngestError::config("Endpoint URLs cannot be empty"));
        }

        if self.youtube.max_retries == 0 {
            return Err(IngestError::config("max_retries must be at least 1"));
        }

        if self.pipeline.max_pages == 0 {
            return Err(IngestError::config("max_pages must be at least 1"));
        }

        if self.pipeline.fetch_concurrency == 0 {
            return Err(IngestError::config("fetch_concurrency must be at least 1"));
        }

        if self.kafka.bootstrap_servers.is_empty() || self.kafka.topic.is_empty() {
            return Err(IngestError::config("Kafka sink is not configured"));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            youtube: YoutubeConfig {
                api_key: "key".to_string(),
                playlist_id: "PL123".to_string(),
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                max_retries: DEFAULT_MAX_RETRIES,
                retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            },
            registry: RegistryConfig {
                base_url: DEFAULT_REGISTRY_URL.to_string(),
                timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            },
            kafka: KafkaConfig {
                bootstrap_servers: DEFAULT_BOOTSTRAP_SERVERS.to_string(),
                topic: DEFAULT_TOPIC.to_string(),
                message_timeout_ms: DEFAULT_MESSAGE_TIMEOUT_MS,
            },
            pipeline: PipelineConfig {
                max_pages: DEFAULT_MAX_PAGES,
                fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
                flush_timeout_secs: DEFAULT_FLUSH_TIMEOUT_SECS,
            },
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = valid_config();
        config.youtube.api_key.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_page_bound_rejected() {
        let mut config = valid_config();
        config.pipeline.max_pages = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_environment() {
        std::env::set_var("YOUTUBE_API_KEY", "env-key");
        std::env::set_var("YOUTUBE_PLAYLIST_ID", "PL-env");
        std::env::set_var("VIDWATCH_MAX_PAGES", "7");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.youtube.api_key, "env-key");
        assert_eq!(config.youtube.playlist_id, "PL-env");
        assert_eq!(config.pipeline.max_pages, 7);
        assert_eq!(config.kafka.topic, DEFAULT_TOPIC);

        std::env::remove_var("YOUTUBE_API_KEY");
        std::env::remove_var("YOUTUBE_PLAYLIST_ID");
        std::env::remove_var("VIDWATCH_MAX_PAGES");
    }
}
