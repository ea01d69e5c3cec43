use std::path::{Component, Path, PathBuf};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::Method;
use tracing::warn;

use super::StorageBackend;
use crate::config::StorageConfig;
use crate::services::signer::UrlSigner;

/// Filesystem fallback backend for self-hosted deployments without object
/// storage. Upload/download URLs point back at this service's own
/// `/api/files/{bucket}/{key}` endpoint, signed by the `UrlSigner`.
pub struct LocalFilesystemBackend {
    signer: UrlSigner,
    storage_root: PathBuf,
}

impl LocalFilesystemBackend {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            signer: UrlSigner::new(config),
            storage_root: config.storage_root.clone(),
        }
    }
}

/// Map `{bucket}/{key}` onto a path under `root`, rejecting any component
/// that would escape it. Only plain path segments are allowed; `..`, leading
/// `/` and empty segments all fail. The result is guaranteed to be a
/// descendant of `root`.
pub fn resolve_object_path(root: &Path, bucket: &str, key: &str) -> Result<PathBuf> {
    if bucket.is_empty() || key.is_empty() {
        return Err(anyhow!("empty bucket or key"));
    }

    let mut path = root.to_path_buf();
    for segment in [bucket, key] {
        for component in Path::new(segment).components() {
            match component {
                Component::Normal(part) => path.push(part),
                _ => return Err(anyhow!("path escapes storage root: {}/{}", bucket, key)),
            }
        }
    }

    Ok(path)
}

#[async_trait]
impl StorageBackend for LocalFilesystemBackend {
    async fn generate_upload_url(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        expires_in: i64,
    ) -> Result<String> {
        // The bucket is just a folder under the storage root here
        let path = format!("/api/files/{}/{}", bucket, key);
        Ok(self.signer.build_signed_url(&path, &Method::PUT, expires_in))
    }

    async fn generate_download_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: i64,
    ) -> Result<String> {
        let path = format!("/api/files/{}/{}", bucket, key);
        Ok(self.signer.build_signed_url(&path, &Method::GET, expires_in))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let path = resolve_object_path(&self.storage_root, bucket, key)?;
        if let Err(e) = tokio::fs::remove_file(&path).await {
            // Deletion is best-effort cleanup; a missing or locked file
            // must not fail the calling operation
            warn!("Failed to delete local file {}: {}", path.display(), e);
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}
