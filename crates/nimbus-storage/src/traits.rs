//! Storage abstraction trait
//!
//! This module defines the `BucketStore` trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Creation raced with another creator using the same credentials.
    #[error("Bucket already owned by you: {0}")]
    AlreadyOwned(String),

    /// The name is taken by someone else.
    #[error("Bucket name already taken: {0}")]
    AlreadyExists(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a metadata-only bucket existence check.
#[derive(Debug)]
pub enum BucketProbe {
    Found,
    NotFound,
    /// Any failure that is not a plain "no such bucket", e.g. access denied.
    Other(StorageError),
}

/// Storage abstraction trait
///
/// Bucket-level operations plus a single object upload. Backends never decide
/// policy; the provisioner and the archive pipeline drive them.
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Check whether a bucket exists without touching its contents.
    async fn probe_bucket(&self, bucket: &str) -> BucketProbe;

    /// Create a bucket in the given region.
    ///
    /// Returns `StorageError::AlreadyOwned` when the bucket appeared between the
    /// probe and this call.
    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()>;

    /// Deny public ACLs, public policies and cross-account public access.
    async fn block_public_access(&self, bucket: &str) -> StorageResult<()>;

    /// Enable default server-side encryption (AES-256).
    async fn enable_default_encryption(&self, bucket: &str) -> StorageResult<()>;

    /// Upload the contents of a local file to `bucket` at `key`.
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
