use std::env;
use std::path::PathBuf;

/// Signing secret used when `SIGNING_SECRET` is unset. Local-dev fallback
/// only; startup logs a warning when this is active.
pub const FALLBACK_SIGNING_SECRET: &str = "fallback-secret-do-not-use-in-prod";

/// Storage gateway configuration, resolved once at startup and passed
/// explicitly to the signer and storage backends.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// HMAC secret for signed URLs
    pub signing_secret: String,

    /// Public base URL prepended to signed local paths (default: "http://localhost:3000")
    pub base_url: String,

    /// Root directory for the local filesystem backend (default: "./storage")
    pub storage_root: PathBuf,

    /// S3 credentials; the remote backend is selected when both are non-empty
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,

    /// S3 region (default: "us-east-1")
    pub s3_region: String,

    /// Custom S3 endpoint for MinIO/R2 style deployments
    pub s3_endpoint: Option<String>,

    /// Use path-style addressing instead of virtual-hosted buckets
    pub s3_force_path_style: bool,

    /// Bucket for board cover attachments (default: "attachments")
    pub attachments_bucket: String,

    /// Bucket for user avatars (default: "avatars")
    pub avatars_bucket: String,

    /// Default validity window for signed URLs in seconds (default: 3600)
    pub url_ttl_secs: i64,

    /// Maximum accepted upload body in bytes (default: 32 MB)
    pub max_upload_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            signing_secret: FALLBACK_SIGNING_SECRET.to_string(),
            base_url: "http://localhost:3000".to_string(),
            storage_root: PathBuf::from("storage"),
            s3_access_key_id: None,
            s3_secret_access_key: None,
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_force_path_style: false,
            attachments_bucket: "attachments".to_string(),
            avatars_bucket: "avatars".to_string(),
            url_ttl_secs: 3600,
            max_upload_size: 32 * 1024 * 1024, // 32 MB
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}

impl StorageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            signing_secret: non_empty("SIGNING_SECRET").unwrap_or(default.signing_secret),

            base_url: non_empty("BASE_URL").unwrap_or(default.base_url),

            storage_root: non_empty("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.storage_root),

            s3_access_key_id: non_empty("S3_ACCESS_KEY_ID"),
            s3_secret_access_key: non_empty("S3_SECRET_ACCESS_KEY"),

            s3_region: non_empty("S3_REGION").unwrap_or(default.s3_region),

            s3_endpoint: non_empty("S3_ENDPOINT"),

            s3_force_path_style: env::var("S3_FORCE_PATH_STYLE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default.s3_force_path_style),

            attachments_bucket: non_empty("ATTACHMENTS_BUCKET")
                .unwrap_or(default.attachments_bucket),

            avatars_bucket: non_empty("AVATARS_BUCKET").unwrap_or(default.avatars_bucket),

            url_ttl_secs: env::var("URL_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.url_ttl_secs),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),
        }
    }

    /// The remote object-storage backend is selected when both credential
    /// strings are present and non-empty; pure in the two values.
    pub fn is_remote_configured(&self) -> bool {
        self.s3_access_key_id.is_some() && self.s3_secret_access_key.is_some()
    }

    /// True when no explicit signing secret was provided
    pub fn uses_fallback_secret(&self) -> bool {
        self.signing_secret == FALLBACK_SIGNING_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.url_ttl_secs, 3600);
        assert_eq!(config.max_upload_size, 32 * 1024 * 1024);
        assert_eq!(config.attachments_bucket, "attachments");
        assert_eq!(config.avatars_bucket, "avatars");
        assert!(config.uses_fallback_secret());
    }

    #[test]
    fn test_backend_selection_requires_both_credentials() {
        let mut config = StorageConfig::default();
        assert!(!config.is_remote_configured());

        config.s3_access_key_id = Some("AKIA123".to_string());
        assert!(!config.is_remote_configured());

        config.s3_secret_access_key = Some("secret".to_string());
        assert!(config.is_remote_configured());

        config.s3_access_key_id = None;
        assert!(!config.is_remote_configured());
    }
}
