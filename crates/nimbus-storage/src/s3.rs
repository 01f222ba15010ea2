use crate::traits::{BucketProbe, BucketStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, PublicAccessBlockConfiguration,
    ServerSideEncryption, ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration,
    ServerSideEncryptionRule,
};
use aws_sdk_s3::Client;
use std::path::Path;

/// Region in which S3 rejects an explicit location constraint.
const DEFAULT_S3_REGION: &str = "us-east-1";

/// S3 bucket store implementation
#[derive(Clone)]
pub struct S3BucketStore {
    client: Client,
}

impl S3BucketStore {
    /// Create a new S3BucketStore instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config)
            .load()
            .await;

        let store = Self::from_sdk_config(&config, endpoint_url.as_deref());

        tracing::debug!(
            region = %region,
            endpoint = ?endpoint_url,
            "S3 client initialized"
        );

        Ok(store)
    }

    fn from_sdk_config(config: &aws_config::SdkConfig, endpoint_url: Option<&str>) -> Self {
        let client = match endpoint_url {
            Some(endpoint) => {
                // Path-style addressing is required by MinIO and most S3-compatible providers
                let s3_config = aws_sdk_s3::config::Builder::from(config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                Client::from_conf(s3_config)
            }
            None => Client::new(config),
        };

        S3BucketStore { client }
    }
}

/// Location constraint to send with CreateBucket, if any.
fn location_constraint(region: &str) -> Option<BucketLocationConstraint> {
    if region == DEFAULT_S3_REGION {
        None
    } else {
        Some(BucketLocationConstraint::from(region))
    }
}

#[async_trait]
impl BucketStore for S3BucketStore {
    async fn probe_bucket(&self, bucket: &str) -> BucketProbe {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => BucketProbe::Found,
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadBucketError::NotFound(_) => BucketProbe::NotFound,
                    _ if service_err.raw().status().as_u16() == 404 => BucketProbe::NotFound,
                    _ => BucketProbe::Other(StorageError::BackendError(
                        DisplayErrorContext(&e).to_string(),
                    )),
                },
                _ => BucketProbe::Other(StorageError::BackendError(
                    DisplayErrorContext(&e).to_string(),
                )),
            },
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(constraint) = location_constraint(region) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        request.send().await.map_err(|e| match &e {
            SdkError::ServiceError(service_err) => match service_err.err() {
                CreateBucketError::BucketAlreadyOwnedByYou(_) => {
                    StorageError::AlreadyOwned(bucket.to_string())
                }
                CreateBucketError::BucketAlreadyExists(_) => {
                    StorageError::AlreadyExists(bucket.to_string())
                }
                _ => StorageError::BackendError(DisplayErrorContext(&e).to_string()),
            },
            _ => StorageError::BackendError(DisplayErrorContext(&e).to_string()),
        })?;

        tracing::info!(
            bucket = %bucket,
            region = %region,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 bucket created"
        );

        Ok(())
    }

    async fn block_public_access(&self, bucket: &str) -> StorageResult<()> {
        let configuration = PublicAccessBlockConfiguration::builder()
            .block_public_acls(true)
            .ignore_public_acls(true)
            .block_public_policy(true)
            .restrict_public_buckets(true)
            .build();

        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(configuration)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %bucket, "S3 public access block applied");
        Ok(())
    }

    async fn enable_default_encryption(&self, bucket: &str) -> StorageResult<()> {
        let by_default = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(ServerSideEncryption::Aes256)
            .build()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let rule = ServerSideEncryptionRule::builder()
            .apply_server_side_encryption_by_default(by_default)
            .build();

        let configuration = ServerSideEncryptionConfiguration::builder()
            .rules(rule)
            .build()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        self.client
            .put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(configuration)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %bucket, "S3 default encryption enabled");
        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let body = ByteStream::from_path(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let size = body.size_hint().0;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(DisplayErrorContext(&e).to_string())
            })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioner::{BucketProvisioner, Provisioned};
    use aws_sdk_s3::config::{Credentials, SharedCredentialsProvider};
    use mockito::{Matcher, Server, ServerGuard};
    use std::sync::Arc;

    const BUCKET_PATH: &str = r"^/fresh/?$";

    /// Store pointed at a local mock server, with static credentials so no
    /// provider chain lookup happens.
    fn store_for(server: &ServerGuard) -> S3BucketStore {
        let config = aws_config::SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new("ap-south-1"))
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "test-access-key",
                "test-secret-key",
                None,
                None,
                "nimbus-tests",
            )))
            .retry_config(RetryConfig::disabled())
            .build();

        S3BucketStore::from_sdk_config(&config, Some(&server.url()))
    }

    fn error_body(code: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Error><Code>{code}</Code><Message>{code}</Message>\
             <BucketName>fresh</BucketName><RequestId>req-1</RequestId></Error>"
        )
    }

    fn create_mock(server: &mut ServerGuard, status: usize, code: &str) -> mockito::Mock {
        server
            .mock("PUT", Matcher::Regex(BUCKET_PATH.into()))
            .match_query(Matcher::Exact(String::new()))
            .with_status(status)
            .with_header("content-type", "application/xml")
            .with_body(error_body(code))
    }

    #[test]
    fn us_east_1_has_no_location_constraint() {
        assert!(location_constraint("us-east-1").is_none());
    }

    #[test]
    fn other_regions_are_constrained() {
        assert_eq!(
            location_constraint("ap-south-1"),
            Some(BucketLocationConstraint::ApSouth1)
        );
        assert_eq!(
            location_constraint("eu-west-1"),
            Some(BucketLocationConstraint::EuWest1)
        );
    }

    #[tokio::test]
    async fn head_404_means_bucket_not_found() {
        let mut server = Server::new_async().await;
        let head = server
            .mock("HEAD", Matcher::Regex(BUCKET_PATH.into()))
            .with_status(404)
            .create_async()
            .await;

        let probe = store_for(&server).probe_bucket("fresh").await;

        assert!(matches!(probe, BucketProbe::NotFound));
        head.assert_async().await;
    }

    #[tokio::test]
    async fn head_403_is_not_treated_as_missing() {
        let mut server = Server::new_async().await;
        server
            .mock("HEAD", Matcher::Regex(BUCKET_PATH.into()))
            .with_status(403)
            .create_async()
            .await;

        let probe = store_for(&server).probe_bucket("fresh").await;

        assert!(matches!(
            probe,
            BucketProbe::Other(StorageError::BackendError(_))
        ));
    }

    #[tokio::test]
    async fn create_conflict_owned_by_us_maps_to_already_owned() {
        let mut server = Server::new_async().await;
        create_mock(&mut server, 409, "BucketAlreadyOwnedByYou")
            .create_async()
            .await;

        let err = store_for(&server)
            .create_bucket("fresh", "ap-south-1")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::AlreadyOwned(ref name) if name == "fresh"));
    }

    #[tokio::test]
    async fn create_conflict_owned_elsewhere_maps_to_already_exists() {
        let mut server = Server::new_async().await;
        create_mock(&mut server, 409, "BucketAlreadyExists")
            .create_async()
            .await;

        let err = store_for(&server)
            .create_bucket("fresh", "ap-south-1")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::AlreadyExists(ref name) if name == "fresh"));
    }

    #[tokio::test]
    async fn bucket_reported_as_ours_on_create_is_still_secured() {
        let mut server = Server::new_async().await;
        server
            .mock("HEAD", Matcher::Regex(BUCKET_PATH.into()))
            .with_status(404)
            .create_async()
            .await;
        let create = create_mock(&mut server, 409, "BucketAlreadyOwnedByYou")
            .expect(1)
            .create_async()
            .await;
        let public_access = server
            .mock("PUT", Matcher::Regex(BUCKET_PATH.into()))
            .match_query(Matcher::Regex("publicAccessBlock".into()))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let encryption = server
            .mock("PUT", Matcher::Regex(BUCKET_PATH.into()))
            .match_query(Matcher::Regex("encryption".into()))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let store: Arc<dyn BucketStore> = Arc::new(store_for(&server));
        let outcome = BucketProvisioner::new(store, "ap-south-1")
            .ensure("fresh")
            .await
            .unwrap();

        assert_eq!(outcome, Provisioned::CreatedElsewhere);
        create.assert_async().await;
        public_access.assert_async().await;
        encryption.assert_async().await;
    }
}
