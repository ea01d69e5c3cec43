use axum::http::Method;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::StorageConfig;

type HmacSha256 = Hmac<Sha256>;

/// Issues and checks HMAC-signed, time-limited URLs for the local storage
/// backend. A signed request carries its own expiry and signature as query
/// parameters; validity is fully recomputable from the secret, so nothing
/// is persisted.
#[derive(Clone)]
pub struct UrlSigner {
    secret: String,
    base_url: String,
}

impl UrlSigner {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            secret: config.signing_secret.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// HMAC-SHA256 over `"{path}:{method}:{expires_at}"`, hex-encoded.
    /// The path is a controlled storage key and the method an HTTP verb, so
    /// the `:` separator cannot collide.
    pub fn sign(&self, path: &str, method: &Method, expires_at: i64) -> String {
        let data = format!("{}:{}:{}", path, method.as_str(), expires_at);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(data.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a signature for a reconstructed path and method. Unparsable or
    /// past expiries are rejected before any HMAC is computed.
    pub fn verify(&self, path: &str, method: &Method, expires: &str, signature: &str) -> bool {
        let Ok(expires_at) = expires.parse::<i64>() else {
            return false;
        };
        if Utc::now().timestamp() > expires_at {
            return false;
        }
        let expected = self.sign(path, method, expires_at);
        expected == signature
    }

    /// Build `{base_url}{path}?expires={expires_at}&signature={signature}`.
    /// `path` must be byte-for-byte identical to what the file endpoint
    /// reconstructs from its routing, otherwise verification fails closed.
    pub fn build_signed_url(&self, path: &str, method: &Method, ttl_secs: i64) -> String {
        let expires_at = Utc::now().timestamp() + ttl_secs;
        let signature = self.sign(path, method, expires_at);
        format!(
            "{}{}?expires={}&signature={}",
            self.base_url, path, expires_at, signature
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UrlSigner {
        let config = StorageConfig {
            signing_secret: "test-secret".to_string(),
            base_url: "http://localhost:3000".to_string(),
            ..Default::default()
        };
        UrlSigner::new(&config)
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let s = signer();
        let expires_at = Utc::now().timestamp() + 3600;
        let sig = s.sign("/api/files/avatars/u1/a.png", &Method::PUT, expires_at);
        assert!(s.verify(
            "/api/files/avatars/u1/a.png",
            &Method::PUT,
            &expires_at.to_string(),
            &sig
        ));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let s = signer();
        let expires_at = Utc::now().timestamp() - 1;
        // Signature itself is correct, the window has just passed
        let sig = s.sign("/api/files/avatars/u1/a.png", &Method::GET, expires_at);
        assert!(!s.verify(
            "/api/files/avatars/u1/a.png",
            &Method::GET,
            &expires_at.to_string(),
            &sig
        ));
    }

    #[test]
    fn test_verify_rejects_unparsable_expiry() {
        let s = signer();
        let expires_at = Utc::now().timestamp() + 3600;
        let sig = s.sign("/api/files/avatars/u1/a.png", &Method::GET, expires_at);
        assert!(!s.verify("/api/files/avatars/u1/a.png", &Method::GET, "soon", &sig));
        assert!(!s.verify("/api/files/avatars/u1/a.png", &Method::GET, "", &sig));
    }

    #[test]
    fn test_verify_rejects_tampered_inputs() {
        let s = signer();
        let expires_at = Utc::now().timestamp() + 3600;
        let expires = expires_at.to_string();
        let sig = s.sign("/api/files/avatars/u1/a.png", &Method::PUT, expires_at);

        // Changed path
        assert!(!s.verify("/api/files/avatars/u2/a.png", &Method::PUT, &expires, &sig));
        // Changed method
        assert!(!s.verify("/api/files/avatars/u1/a.png", &Method::GET, &expires, &sig));
        // Changed expiry without re-signing
        assert!(!s.verify(
            "/api/files/avatars/u1/a.png",
            &Method::PUT,
            &(expires_at + 1).to_string(),
            &sig
        ));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let s = signer();
        let other = UrlSigner::new(&StorageConfig {
            signing_secret: "other-secret".to_string(),
            ..Default::default()
        });
        let expires_at = Utc::now().timestamp() + 3600;
        let sig = other.sign("/api/files/avatars/u1/a.png", &Method::GET, expires_at);
        assert!(!s.verify(
            "/api/files/avatars/u1/a.png",
            &Method::GET,
            &expires_at.to_string(),
            &sig
        ));
    }

    #[test]
    fn test_build_signed_url_verifies() {
        let s = signer();
        let url = s.build_signed_url("/api/files/avatars/u1/a.png", &Method::PUT, 3600);
        assert!(url.starts_with("http://localhost:3000/api/files/avatars/u1/a.png?expires="));

        let query = url.split_once('?').unwrap().1;
        let mut expires = "";
        let mut signature = "";
        for pair in query.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            match k {
                "expires" => expires = v,
                "signature" => signature = v,
                _ => {}
            }
        }
        assert!(s.verify("/api/files/avatars/u1/a.png", &Method::PUT, expires, signature));
    }
}
