//! Nimbus Core Library
//!
//! This crate provides the configuration, error types and domain values shared by
//! every Nimbus component: bucket identity, the weather payload and the archive
//! key layout.
//!
//! # Archive key format
//!
//! Archived observations are stored under
//! `raw/{year}/{month}/{day}/{location_slug}/{location_slug}_{timestamp}.json`.
//! Key generation is centralized in the `keys` module so the local artifact name
//! and the remote key always come from the same timestamp capture.

pub mod bucket;
pub mod config;
pub mod error;
pub mod keys;
pub mod payload;
pub mod storage_types;

// Re-export commonly used types
pub use bucket::BucketIdentity;
pub use config::Config;
pub use error::ConfigError;
pub use keys::{location_slug, ArchiveKey, TIMESTAMP_FORMAT};
pub use payload::WeatherPayload;
pub use storage_types::StorageBackend;
