//! Bucket provisioning
//!
//! Makes sure the archive bucket exists. A bucket that already exists is reused
//! untouched; a bucket created here is secured immediately (public access blocked,
//! default encryption on) before anything is written to it.

use crate::traits::{BucketProbe, BucketStore, StorageError};
use std::sync::Arc;
use thiserror::Error;

/// Provisioning failures. All of them abort the run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Failed to check bucket {bucket}: {source}")]
    Probe {
        bucket: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to create bucket {bucket}: {source}")]
    Create {
        bucket: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to block public access on bucket {bucket}: {source}")]
    PublicAccessBlock {
        bucket: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to enable encryption on bucket {bucket}: {source}")]
    Encryption {
        bucket: String,
        #[source]
        source: StorageError,
    },
}

/// What `ensure` found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// The bucket was already there and was left as-is.
    Existing,
    /// Created and secured by this call.
    Created,
    /// Creation reported the bucket as already ours (a concurrent creator, or
    /// a retried request whose first attempt succeeded). Secured anyway.
    CreatedElsewhere,
}

pub struct BucketProvisioner {
    store: Arc<dyn BucketStore>,
    region: String,
}

impl BucketProvisioner {
    pub fn new(store: Arc<dyn BucketStore>, region: impl Into<String>) -> Self {
        Self {
            store,
            region: region.into(),
        }
    }

    /// Ensure `bucket` exists, creating and securing it when missing.
    ///
    /// Performs at most one creation and one write of each security setting.
    #[tracing::instrument(skip(self), fields(region = %self.region))]
    pub async fn ensure(&self, bucket: &str) -> Result<Provisioned, ProvisionError> {
        match self.store.probe_bucket(bucket).await {
            BucketProbe::Found => {
                tracing::info!(bucket = %bucket, "Bucket already exists, reusing");
                return Ok(Provisioned::Existing);
            }
            BucketProbe::NotFound => {
                tracing::info!(bucket = %bucket, "Bucket not found, creating");
            }
            BucketProbe::Other(source) => {
                return Err(ProvisionError::Probe {
                    bucket: bucket.to_string(),
                    source,
                });
            }
        }

        // The bucket was absent at probe time, so it is secured even when
        // creation reports it as already ours.
        let provisioned = match self.store.create_bucket(bucket, &self.region).await {
            Ok(()) => Provisioned::Created,
            Err(StorageError::AlreadyOwned(_)) => {
                tracing::warn!(
                    bucket = %bucket,
                    "Bucket already owned by us after probe reported it missing, securing it"
                );
                Provisioned::CreatedElsewhere
            }
            Err(source) => {
                return Err(ProvisionError::Create {
                    bucket: bucket.to_string(),
                    source,
                });
            }
        };

        self.store
            .block_public_access(bucket)
            .await
            .map_err(|source| ProvisionError::PublicAccessBlock {
                bucket: bucket.to_string(),
                source,
            })?;

        self.store
            .enable_default_encryption(bucket)
            .await
            .map_err(|source| ProvisionError::Encryption {
                bucket: bucket.to_string(),
                source,
            })?;

        tracing::info!(
            bucket = %bucket,
            "Bucket created with encryption and public access blocked"
        );

        Ok(provisioned)
    }
}
