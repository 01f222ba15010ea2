//! Nimbus Services
//!
//! The two steps that follow bucket provisioning: fetching the current weather
//! with bounded retry, and archiving the document into the bucket through a
//! transient local file.

pub mod archive;
pub mod fetcher;

pub use archive::{ArchiveError, ArchiveOutcome, ArchivePipeline, ARCHIVE_CONTENT_TYPE};
pub use fetcher::{FetchError, OpenWeatherClient, WeatherFetcher, WeatherSource};
