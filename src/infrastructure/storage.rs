use std::sync::Arc;

use aws_sdk_s3::config::{Credentials, Region};
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::services::storage::{LocalFilesystemBackend, S3StorageBackend, StorageBackend};

/// Resolve the storage backend once at startup. Object storage is selected
/// when both S3 credential strings are configured; otherwise files live on
/// the local filesystem behind signed URLs.
pub async fn setup_storage(config: &StorageConfig) -> Arc<dyn StorageBackend> {
    if config.uses_fallback_secret() {
        warn!("⚠️  SIGNING_SECRET is not set; signed URLs use an insecure fallback secret");
    }

    if !config.is_remote_configured() {
        info!("📁 Local storage: {}", config.storage_root.display());
        return Arc::new(LocalFilesystemBackend::new(config));
    }

    let access_key = config.s3_access_key_id.clone().unwrap_or_default();
    let secret_key = config.s3_secret_access_key.clone().unwrap_or_default();

    let mut loader = aws_config::from_env()
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(Credentials::new(access_key, secret_key, None, None, "static"));

    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.s3_force_path_style)
        .build();

    info!(
        "☁️  S3 Storage: {} (region: {})",
        config.s3_endpoint.as_deref().unwrap_or("default endpoint"),
        config.s3_region
    );

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    Arc::new(S3StorageBackend::new(s3_client))
}
