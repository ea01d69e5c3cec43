use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;

use super::StorageBackend;

/// Object-storage backend using the SDK's native pre-signed requests.
/// SDK failures (network, auth, permissions) propagate to the caller
/// unmodified.
pub struct S3StorageBackend {
    client: Client,
}

impl S3StorageBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn presigning(expires_in: i64) -> Result<PresigningConfig> {
        let expires_in = Duration::from_secs(expires_in.max(1) as u64);
        Ok(PresigningConfig::expires_in(expires_in)?)
    }
}

#[async_trait]
impl StorageBackend for S3StorageBackend {
    async fn generate_upload_url(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in: i64,
    ) -> Result<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presigning(expires_in)?)
            .await?;
        Ok(presigned.uri().to_string())
    }

    async fn generate_download_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: i64,
    ) -> Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(Self::presigning(expires_in)?)
            .await?;
        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "s3"
    }
}
