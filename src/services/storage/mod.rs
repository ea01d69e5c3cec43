pub mod local;
pub mod s3;

use anyhow::Result;
use async_trait::async_trait;

pub use local::LocalFilesystemBackend;
pub use s3::S3StorageBackend;

/// Common capability interface over the two storage backends. The concrete
/// backend is chosen once at startup (see `infrastructure::storage`) and
/// injected as `Arc<dyn StorageBackend>`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Time-limited URL a client can PUT raw file bytes to.
    async fn generate_upload_url(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in: i64,
    ) -> Result<String>;

    /// Time-limited URL a client can GET the object from.
    async fn generate_download_url(&self, bucket: &str, key: &str, expires_in: i64)
    -> Result<String>;

    /// Remove the object. Backends treat missing objects as best-effort
    /// cleanup rather than an error.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Short backend name for health reporting and startup logs.
    fn kind(&self) -> &'static str;
}
