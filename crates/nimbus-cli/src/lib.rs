//! Nimbus run orchestration: provision the bucket, fetch the weather, archive it.

use anyhow::Context;
use nimbus_core::{BucketIdentity, Config};
use nimbus_services::{ArchiveOutcome, ArchivePipeline, WeatherFetcher, WeatherSource};
use nimbus_storage::{BucketProvisioner, BucketStore, Provisioned};
use std::sync::Arc;

/// What a completed run did.
#[derive(Debug)]
pub struct RunSummary {
    pub bucket: BucketIdentity,
    pub provisioned: Provisioned,
    pub outcome: ArchiveOutcome,
}

/// Run one provision → fetch → archive cycle.
///
/// Provisioning, fetch and local write failures abort the run. An upload
/// failure does not: it is logged and reported in the summary.
pub async fn run(
    config: &Config,
    store: Arc<dyn BucketStore>,
    source: Arc<dyn WeatherSource>,
) -> anyhow::Result<RunSummary> {
    let bucket = config.bucket();

    let provisioner = BucketProvisioner::new(store.clone(), config.region.clone());
    let fetcher = WeatherFetcher::new(source);
    let pipeline = ArchivePipeline::new(store, config.archive_work_dir.clone());

    let provisioned = provisioner
        .ensure(bucket.as_str())
        .await
        .with_context(|| format!("Failed to provision bucket {}", bucket))?;

    let payload = fetcher
        .fetch(&config.location, config.fetch_retries)
        .await
        .with_context(|| format!("Failed to fetch weather for {}", config.location))?;

    let outcome = pipeline
        .archive(&payload, bucket.as_str(), &config.location)
        .await
        .context("Failed to archive weather data")?;

    Ok(RunSummary {
        bucket,
        provisioned,
        outcome,
    })
}

/// Initialize tracing for the binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
