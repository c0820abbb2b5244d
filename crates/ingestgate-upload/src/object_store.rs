//! §6.2 presigned-PUT / later-GET object storage, backed by S3.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use ingestgate_core::error::{Error, Result};
use ingestgate_core::ports::ObjectStore;

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
}

impl S3Config {
    pub fn from_env() -> Self {
        Self {
            bucket: std::env::var("UPLOAD_BUCKET_NAME").unwrap_or_default(),
            region: std::env::var("UPLOAD_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub async fn from_env(config: S3Config) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region))
            .load()
            .await;
        Self::new(Client::new(&aws_config), config.bucket)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        mime_type: &str,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>)> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| Error::StorageUnavailable(format!("invalid presign ttl: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(mime_type)
            .presigned(presigning)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("failed to presign PUT: {e}")))?;

        let expires_at = Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default();
        Ok((request.uri().to_string(), expires_at))
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| Error::StorageUnavailable(format!("invalid presign ttl: {e}")))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| Error::StorageUnavailable(format!("failed to presign GET: {e}")))?;

        Ok(request.uri().to_string())
    }
}
