//! Configuration module
//!
//! Nimbus is configured entirely from the environment (a `.env` file is honoured).
//! Only the weather API key is required; everything else has a default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::bucket::BucketIdentity;
use crate::error::ConfigError;
use crate::storage_types::StorageBackend;

const DEFAULT_REGION: &str = "ap-south-1";
const DEFAULT_TEAM: &str = "teamx";
const DEFAULT_USER: &str = "userx";
const DEFAULT_LOCATION: &str = "Bengaluru,IN";
const DEFAULT_OPENWEATHER_BASE_URL: &str = "http://api.openweathermap.org";
const DEFAULT_FETCH_RETRIES: u32 = 3;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WORK_DIR: &str = ".";

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Storage region for bucket creation and client routing
    pub region: String,
    pub team: String,
    pub user: String,
    /// Weather query target, `"City,CountryCode"`
    pub location: String,
    pub api_key: String,
    /// Explicit bucket name; when absent the name is derived from team/user
    pub bucket_name: Option<String>,
    pub openweather_base_url: String,
    pub fetch_retries: u32,
    pub fetch_timeout_secs: u64,
    /// Directory the transient artifact is written to
    pub archive_work_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("team", &self.team)
            .field("user", &self.user)
            .field("location", &self.location)
            .field("api_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("openweather_base_url", &self.openweather_base_url)
            .field("fetch_retries", &self.fetch_retries)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("archive_work_dir", &self.archive_work_dir)
            .field("storage_backend", &self.storage_backend)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("local_storage_path", &self.local_storage_path)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENWEATHER_API_KEY").ok_or(ConfigError::Missing("OPENWEATHER_API_KEY"))?;

        let fetch_retries = match var("FETCH_RETRIES") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::invalid("FETCH_RETRIES", e.to_string()))?,
            None => DEFAULT_FETCH_RETRIES,
        };

        let fetch_timeout_secs = match var("FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("FETCH_TIMEOUT_SECS", e.to_string()))?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|e| ConfigError::invalid("STORAGE_BACKEND", e.to_string()))?,
            None => StorageBackend::S3,
        };

        let config = Config {
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            team: var("TEAM").unwrap_or_else(|| DEFAULT_TEAM.to_string()),
            user: var("USERNAME").unwrap_or_else(|| DEFAULT_USER.to_string()),
            location: var("CITY").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            api_key,
            bucket_name: var("BUCKET_NAME"),
            openweather_base_url: var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.to_string()),
            fetch_retries,
            fetch_timeout_secs,
            archive_work_dir: var("ARCHIVE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
            storage_backend,
            s3_endpoint: var("S3_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("OPENWEATHER_API_KEY"));
        }
        if self.fetch_retries == 0 {
            return Err(ConfigError::invalid("FETCH_RETRIES", "must be at least 1"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::invalid("FETCH_TIMEOUT_SECS", "must be at least 1"));
        }
        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(ConfigError::Missing("LOCAL_STORAGE_PATH"));
        }
        Ok(())
    }

    /// Bucket this run archives into.
    pub fn bucket(&self) -> BucketIdentity {
        BucketIdentity::resolve(self.bucket_name.as_deref(), &self.team, &self.user)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
