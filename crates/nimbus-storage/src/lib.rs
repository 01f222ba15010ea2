//! Nimbus Storage Library
//!
//! This crate provides the bucket-level storage abstraction used by Nimbus: the
//! `BucketStore` trait, an S3 implementation, a local filesystem implementation
//! for development, and the `BucketProvisioner` that makes sure the archive bucket
//! exists with public access blocked and default encryption enabled.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod provisioner;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_bucket_store;
#[cfg(feature = "storage-local")]
pub use local::LocalBucketStore;
pub use nimbus_core::StorageBackend;
pub use provisioner::{BucketProvisioner, ProvisionError, Provisioned};
#[cfg(feature = "storage-s3")]
pub use s3::S3BucketStore;
pub use traits::{BucketProbe, BucketStore, StorageError, StorageResult};
