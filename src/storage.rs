//! Object storage for ticket attachments (S3 API, typically MinIO).

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use log::{debug, info};

use crate::config::StorageConfig;
use crate::error::StorageError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError>;

    async fn make_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StorageError>;

    /// Creates the bucket when it is missing.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if !self.bucket_exists(bucket).await? {
            info!("creating bucket {}", bucket);
            self.make_bucket(bucket).await?;
        }
        Ok(())
    }
}

pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "catalyst-automations",
        );

        // MinIO only understands path style addressing
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::Bucket {
                        bucket: bucket.to_string(),
                        message: DisplayErrorContext(&err).to_string(),
                    })
                }
            }
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| StorageError::Bucket {
                bucket: bucket.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StorageError> {
        debug!("uploading {} ({} bytes) to {}", key, body.len(), bucket);
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Buckets {
        existing: Mutex<HashSet<String>>,
        created: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStore for Buckets {
        async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
            Ok(self.existing.lock().unwrap().contains(bucket))
        }

        async fn make_bucket(&self, bucket: &str) -> Result<(), StorageError> {
            self.existing.lock().unwrap().insert(bucket.to_string());
            self.created.lock().unwrap().push(bucket.to_string());
            Ok(())
        }

        async fn put_object(&self, _bucket: &str, _key: &str, _body: Bytes) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_ensure_bucket_creates_once() {
        let store = Buckets::default();
        store.ensure_bucket("catalyst-1").await.unwrap();
        store.ensure_bucket("catalyst-1").await.unwrap();
        store.ensure_bucket("catalyst-2").await.unwrap();

        assert_eq!(*store.created.lock().unwrap(), vec!["catalyst-1", "catalyst-2"]);
    }

    #[tokio::test]
    async fn test_s3_store_builds_from_config() {
        let config = StorageConfig {
            host: "minio:9000".to_string(),
            access_key: "minio".to_string(),
            secret_key: "password".to_string(),
            secure: false,
            region: "us-east-1".to_string(),
        };
        let store = S3Store::new(&config);
        assert_eq!(
            store.client.config().region().map(|r| r.to_string()),
            Some("us-east-1".to_string())
        );
    }
}
