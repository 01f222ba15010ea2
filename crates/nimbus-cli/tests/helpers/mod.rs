#![allow(dead_code)]

use async_trait::async_trait;
use nimbus_core::{Config, WeatherPayload};
use nimbus_services::{FetchError, WeatherSource};
use nimbus_storage::{BucketProbe, BucketStore, StorageBackend, StorageError, StorageResult};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// In-memory bucket store that counts every call.
#[derive(Default)]
pub struct RecordingStore {
    buckets: Mutex<HashSet<String>>,
    objects: Mutex<Vec<(String, String)>>,
    pub creates: AtomicU32,
    pub security_writes: AtomicU32,
    pub uploads: AtomicU32,
    pub fail_uploads: bool,
}

impl RecordingStore {
    pub fn with_bucket(name: &str) -> Self {
        let store = RecordingStore::default();
        store.buckets.lock().unwrap().insert(name.to_string());
        store
    }

    pub fn failing_uploads() -> Self {
        RecordingStore {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn objects(&self) -> Vec<(String, String)> {
        self.objects.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BucketStore for RecordingStore {
    async fn probe_bucket(&self, bucket: &str) -> BucketProbe {
        if self.buckets.lock().unwrap().contains(bucket) {
            BucketProbe::Found
        } else {
            BucketProbe::NotFound
        }
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> StorageResult<()> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.buckets.lock().unwrap().insert(bucket.to_string());
        Ok(())
    }

    async fn block_public_access(&self, _bucket: &str) -> StorageResult<()> {
        self.security_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn enable_default_encryption(&self, _bucket: &str) -> StorageResult<()> {
        self.security_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if !path.exists() {
            return Err(StorageError::UploadFailed(format!(
                "{} does not exist",
                path.display()
            )));
        }
        if self.fail_uploads {
            return Err(StorageError::UploadFailed("simulated outage".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Weather source that fails a fixed number of times before succeeding.
pub struct ScriptedSource {
    failures: u32,
    pub calls: AtomicU32,
}

impl ScriptedSource {
    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn current_weather(&self, location: &str) -> Result<WeatherPayload, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(FetchError::Request("connection timed out".into()));
        }
        Ok(serde_json::from_value(serde_json::json!({
            "name": location,
            "main": {"temp": 298.15, "humidity": 70}
        }))
        .unwrap())
    }
}

/// Configuration pointing the work dir at `work_dir`.
pub fn test_config(work_dir: &Path) -> Config {
    let work_dir = work_dir.to_string_lossy().to_string();
    Config::from_lookup(|name| match name {
        "OPENWEATHER_API_KEY" => Some("test-key".to_string()),
        "TEAM" => Some("teamx".to_string()),
        "USERNAME" => Some("userx".to_string()),
        "CITY" => Some("Bengaluru,IN".to_string()),
        "ARCHIVE_WORK_DIR" => Some(work_dir.clone()),
        _ => None,
    })
    .unwrap()
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}
