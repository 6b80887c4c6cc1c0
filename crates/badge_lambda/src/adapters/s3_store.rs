use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use crate::adapters::object_store::BadgeStore;
use crate::config::HandlerConfig;

const BADGE_CACHE_CONTROL: &str = "no-cache, max-age=0";

pub struct S3BadgeStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl S3BadgeStore {
    pub fn new(bucket: impl Into<String>, s3_client: aws_sdk_s3::Client) -> Self {
        Self {
            bucket: bucket.into(),
            s3_client,
        }
    }

    /// Builds a client for the configured bucket with retries disabled, so
    /// a failed write surfaces on the first attempt.
    pub async fn from_config(config: &HandlerConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).retry_config(RetryConfig::disabled());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let aws_config = loader.load().await;
        Self::new(config.bucket.clone(), aws_sdk_s3::Client::new(&aws_config))
    }
}

impl BadgeStore for S3BadgeStore {
    fn write_object(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let content_type = content_type.to_string();
        let client = self.s3_client.clone();
        debug!(
            bucket = %bucket,
            key = %object_key,
            bytes = body_bytes.len(),
            "writing badge object"
        );

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type(content_type)
                    .cache_control(BADGE_CACHE_CONTROL)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }

    fn object_exists(&self, key: &str) -> Result<bool, String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                match client.head_object().bucket(bucket).key(object_key).send().await {
                    Ok(_) => Ok(true),
                    Err(error) => {
                        let missing = error
                            .as_service_error()
                            .map(|service_error| service_error.is_not_found())
                            .unwrap_or(false);
                        if missing {
                            Ok(false)
                        } else {
                            Err(format!("failed to read object metadata from s3: {error}"))
                        }
                    }
                }
            })
        })
    }

    fn delete_object(&self, key: &str) -> Result<(), String> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete object from s3: {error}"))
            })
        })
    }
}
