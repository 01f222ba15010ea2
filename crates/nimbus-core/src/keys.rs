//! Shared key generation for archived observations.
//!
//! Key format: `raw/{year}/{month}/{day}/{slug}/{slug}_{timestamp}.json`, where the
//! timestamp is ISO-8601 basic UTC (`20240115T103000Z`). The date path and the
//! timestamp are formatted from one captured instant.

use chrono::{DateTime, Utc};

/// ISO-8601 basic UTC timestamp format used in file names and keys.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Prefix under which raw provider documents are archived.
const RAW_PREFIX: &str = "raw";

/// Normalize a location (`"Bengaluru,IN"`) into a path segment (`"bengaluru_in"`).
pub fn location_slug(location: &str) -> String {
    location.replace([',', ' '], "_").to_lowercase()
}

/// Storage key and local file name for one archive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveKey {
    slug: String,
    timestamp: String,
    date_path: String,
}

impl ArchiveKey {
    pub fn new(location: &str, captured_at: DateTime<Utc>) -> Self {
        ArchiveKey {
            slug: location_slug(location),
            timestamp: captured_at.format(TIMESTAMP_FORMAT).to_string(),
            date_path: captured_at.format("%Y/%m/%d").to_string(),
        }
    }

    /// `{slug}_{timestamp}.json`
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.slug, self.timestamp)
    }

    /// Full object key inside the bucket.
    pub fn object_key(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            RAW_PREFIX,
            self.date_path,
            self.slug,
            self.file_name()
        )
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}
