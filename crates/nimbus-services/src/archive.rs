//! Archive pipeline
//!
//! One payload becomes one object: the document is written to a local file named
//! after its key, uploaded, and the file is removed again on every exit path.
//! Upload failures are reported in the outcome rather than returned as errors.

use chrono::{DateTime, Utc};
use nimbus_core::{ArchiveKey, WeatherPayload};
use nimbus_storage::{BucketStore, StorageError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

pub const ARCHIVE_CONTENT_TYPE: &str = "application/json";

/// Failures that prevent anything from being uploaded.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to serialize weather payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a completed archive operation.
#[derive(Debug)]
pub enum ArchiveOutcome {
    Uploaded { key: String },
    /// The upload failed; the run carries on and the error has been logged.
    UploadFailed { key: String, error: StorageError },
}

impl ArchiveOutcome {
    pub fn key(&self) -> &str {
        match self {
            ArchiveOutcome::Uploaded { key } | ArchiveOutcome::UploadFailed { key, .. } => key,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self, ArchiveOutcome::Uploaded { .. })
    }
}

/// Local file that must not outlive the archive operation.
///
/// Removed explicitly once the upload settles; dropping it without that (early
/// return, cancellation) removes it synchronously.
struct TransientArtifact {
    path: PathBuf,
    removed: bool,
}

impl TransientArtifact {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) {
        self.removed = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove local artifact"
                );
            }
        }
    }
}

impl Drop for TransientArtifact {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove local artifact on drop"
                );
            }
        }
    }
}

pub struct ArchivePipeline {
    store: Arc<dyn BucketStore>,
    work_dir: PathBuf,
}

impl ArchivePipeline {
    /// `work_dir` holds the transient artifact while it is uploaded.
    pub fn new(store: Arc<dyn BucketStore>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            work_dir: work_dir.into(),
        }
    }

    /// Archive `payload` under a key stamped with the current time.
    pub async fn archive(
        &self,
        payload: &WeatherPayload,
        bucket: &str,
        location: &str,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        self.archive_at(payload, bucket, location, Utc::now()).await
    }

    /// Archive `payload` under a key stamped with `captured_at`.
    ///
    /// The local file name and the object key are both derived from this one
    /// instant.
    #[tracing::instrument(skip(self, payload))]
    pub async fn archive_at(
        &self,
        payload: &WeatherPayload,
        bucket: &str,
        location: &str,
        captured_at: DateTime<Utc>,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        let archive_key = ArchiveKey::new(location, captured_at);
        let key = archive_key.object_key();
        let contents = payload.to_pretty_json()?;

        let artifact = TransientArtifact::new(self.work_dir.join(archive_key.file_name()));
        if let Err(source) = fs::write(artifact.path(), &contents).await {
            let path = artifact.path().to_path_buf();
            artifact.remove().await;
            return Err(ArchiveError::Write { path, source });
        }

        let result = self
            .store
            .upload_file(bucket, &key, artifact.path(), ARCHIVE_CONTENT_TYPE)
            .await;

        artifact.remove().await;

        match result {
            Ok(()) => {
                tracing::info!(
                    bucket = %bucket,
                    key = %key,
                    size_bytes = contents.len(),
                    "Weather observation archived"
                );
                Ok(ArchiveOutcome::Uploaded { key })
            }
            Err(error) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    error = %error,
                    "Upload failed"
                );
                Ok(ArchiveOutcome::UploadFailed { key, error })
            }
        }
    }
}
