//! Vidwatch Ingest - playlist ingestion batch job

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use vidwatch_common::logging::{init_logging, LogConfig};
use vidwatch_ingest::config::AppConfig;
use vidwatch_ingest::pipeline::Pipeline;
use vidwatch_ingest::publish::Publisher;
use vidwatch_ingest::registry::{value_subject, SchemaRegistryClient};
use vidwatch_ingest::youtube::YoutubeClient;

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("vidwatch-ingest".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    let config = AppConfig::load()?;
    info!(
        playlist_id = %config.youtube.playlist_id,
        topic = %config.kafka.topic,
        "starting vidwatch ingestion run"
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let registry = SchemaRegistryClient::new(&config.registry)?;
    let subject = value_subject(&config.kafka.topic);
    let registered = registry.latest_schema(&subject).await?;
    info!(
        subject = %subject,
        schema_id = registered.id,
        schema_version = registered.version,
        "resolved value schema"
    );

    let youtube = YoutubeClient::new(&config.youtube)?;
    let publisher = Publisher::new(&config.kafka, &registered)?;
    let pipeline = Pipeline::new(youtube, publisher, &config, cancel.clone());

    let report = pipeline.run().await?;

    for issue in &report.shape_errors {
        error!(video_id = %issue.video_id, reason = %issue.reason, "video not published");
    }
    for failure in &report.delivery_failures {
        error!(key = %failure.key, reason = %failure.reason, "delivery failed");
    }

    if !report.is_success() {
        anyhow::bail!(
            "ingestion run failed: {} rejected video(s), {} delivery failure(s){}",
            report.shape_errors.len(),
            report.delivery_failures.len(),
            if report.cancelled {
                ", cancelled before completion"
            } else {
                ""
            }
        );
    }

    info!(
        published = report.published,
        delivered = report.delivered,
        "ingestion run complete"
    );
    Ok(())
}

/// Shutdown signal handler (Ctrl+C, and SIGTERM on Unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, finishing in-flight deliveries"),
        _ = terminate => info!("Received SIGTERM, finishing in-flight deliveries"),
    }
}
