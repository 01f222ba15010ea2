//! Nimbus: archive the current weather for one location into object storage.
//!
//! Configured from the environment (see `.env`); OPENWEATHER_API_KEY is required.

use anyhow::Context;
use nimbus_cli::{init_tracing, run};
use nimbus_core::Config;
use nimbus_services::{ArchiveOutcome, OpenWeatherClient};
use nimbus_storage::create_bucket_store;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::debug!(config = ?config, "Configuration loaded");

    let store = create_bucket_store(&config)
        .await
        .context("Failed to initialize storage backend")?;
    let source = OpenWeatherClient::new(
        config.openweather_base_url.clone(),
        config.api_key.clone(),
        config.fetch_timeout(),
    )
    .context("Failed to initialize weather client")?;

    let summary = run(&config, store, Arc::new(source)).await?;

    match &summary.outcome {
        ArchiveOutcome::Uploaded { key } => {
            tracing::info!(bucket = %summary.bucket, key = %key, "Run complete");
        }
        ArchiveOutcome::UploadFailed { key, .. } => {
            tracing::warn!(bucket = %summary.bucket, key = %key, "Run complete without upload");
        }
    }

    Ok(())
}
