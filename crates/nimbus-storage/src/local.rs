use crate::traits::{BucketProbe, BucketStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem bucket store
///
/// Each bucket is a directory under `base_path` and object keys map to relative
/// paths inside it. Meant for development runs without object storage; the
/// security operations have nothing to enforce on a local directory.
#[derive(Clone)]
pub struct LocalBucketStore {
    base_path: PathBuf,
}

impl LocalBucketStore {
    /// Create a new LocalBucketStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one sub-directory per bucket
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBucketStore { base_path })
    }

    fn bucket_path(&self, bucket: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty() || bucket.contains("..") || bucket.contains(['/', '\\']) {
            return Err(StorageError::ConfigError(format!(
                "Invalid bucket name: {}",
                bucket
            )));
        }
        Ok(self.base_path.join(bucket))
    }

    /// Convert a storage key to a filesystem path inside the bucket directory.
    ///
    /// Keys must not contain `..` or start with `/`.
    fn key_to_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.bucket_path(bucket)?.join(key))
    }
}

#[async_trait]
impl BucketStore for LocalBucketStore {
    async fn probe_bucket(&self, bucket: &str) -> BucketProbe {
        let path = match self.bucket_path(bucket) {
            Ok(path) => path,
            Err(e) => return BucketProbe::Other(e),
        };

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => BucketProbe::Found,
            Ok(_) => BucketProbe::Other(StorageError::BackendError(format!(
                "{} exists but is not a directory",
                path.display()
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => BucketProbe::NotFound,
            Err(e) => BucketProbe::Other(StorageError::IoError(e)),
        }
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> StorageResult<()> {
        let path = self.bucket_path(bucket)?;

        match fs::create_dir(&path).await {
            Ok(()) => {
                tracing::info!(bucket = %bucket, path = %path.display(), "Local bucket created");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StorageError::AlreadyOwned(bucket.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn block_public_access(&self, bucket: &str) -> StorageResult<()> {
        tracing::debug!(bucket = %bucket, "Local bucket has no public access surface");
        Ok(())
    }

    async fn enable_default_encryption(&self, bucket: &str) -> StorageResult<()> {
        tracing::debug!(bucket = %bucket, "Local bucket encryption is left to the filesystem");
        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        _content_type: &str,
    ) -> StorageResult<()> {
        let target = self.key_to_path(bucket, key)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let size = fs::copy(path, &target).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                target.display(),
                e
            ))
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            "Local upload successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, LocalBucketStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBucketStore::new(dir.path().join("buckets")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn probe_reports_missing_then_found() {
        let (_dir, store) = store().await;

        assert!(matches!(store.probe_bucket("archive").await, BucketProbe::NotFound));
        store.create_bucket("archive", "local").await.unwrap();
        assert!(matches!(store.probe_bucket("archive").await, BucketProbe::Found));
    }

    #[tokio::test]
    async fn second_create_reports_already_owned() {
        let (_dir, store) = store().await;

        store.create_bucket("archive", "local").await.unwrap();
        let err = store.create_bucket("archive", "local").await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyOwned(name) if name == "archive"));
    }

    #[tokio::test]
    async fn upload_copies_into_nested_key() {
        let (dir, store) = store().await;
        store.create_bucket("archive", "local").await.unwrap();

        let source = dir.path().join("obs.json");
        fs::write(&source, b"{\"temp\": 1}").await.unwrap();

        store
            .upload_file("archive", "raw/2024/01/15/x/obs.json", &source, "application/json")
            .await
            .unwrap();

        let stored = fs::read(dir.path().join("buckets/archive/raw/2024/01/15/x/obs.json"))
            .await
            .unwrap();
        assert_eq!(stored, b"{\"temp\": 1}");
    }

    #[tokio::test]
    async fn upload_rejects_traversal_keys() {
        let (dir, store) = store().await;
        let source = dir.path().join("obs.json");
        fs::write(&source, b"{}").await.unwrap();

        let err = store
            .upload_file("archive", "../escape.json", &source, "application/json")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn upload_of_missing_file_fails() {
        let (dir, store) = store().await;
        store.create_bucket("archive", "local").await.unwrap();

        let err = store
            .upload_file("archive", "raw/a.json", &dir.path().join("nope.json"), "application/json")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }

    #[tokio::test]
    async fn probe_rejects_path_like_bucket_names() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.probe_bucket("../etc").await,
            BucketProbe::Other(StorageError::ConfigError(_))
        ));
    }
}
