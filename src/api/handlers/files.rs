use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{Method, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::AppState;
use crate::api::error::AppError;
use crate::services::storage::local::resolve_object_path;

/// Query parameters of a signed request. Both must be present; anything
/// missing fails verification.
#[derive(Deserialize)]
pub struct SignedParams {
    pub expires: Option<String>,
    pub signature: Option<String>,
}

/// Split the wildcard remainder into `(bucket, key)`. The route only
/// matches under `/api/files/`, so fewer than two segments is a malformed
/// path.
fn split_object_path(path: &str) -> Result<(&str, &str), AppError> {
    match path.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok((bucket, key)),
        _ => Err(AppError::BadRequest("Invalid path".to_string())),
    }
}

/// Re-derive the signature over the canonical path and compare. The
/// canonical form must match what the signer produced byte-for-byte, so a
/// normalization mismatch fails closed. The signature is the only access
/// control on this endpoint.
fn validate_signature(
    state: &AppState,
    url_path: &str,
    method: &Method,
    params: &SignedParams,
) -> Result<(), AppError> {
    let (Some(expires), Some(signature)) = (params.expires.as_deref(), params.signature.as_deref())
    else {
        return Err(AppError::Forbidden("Invalid or expired signature".to_string()));
    };

    if !state.signer.verify(url_path, method, expires, signature) {
        return Err(AppError::Forbidden("Invalid or expired signature".to_string()));
    }

    Ok(())
}

/// `PUT /api/files/{bucket}/{key}` — accept raw file bytes from a signed
/// upload URL and stream them to disk.
pub async fn put_object(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<SignedParams>,
    body: Body,
) -> Result<Json<serde_json::Value>, AppError> {
    let (bucket, key) = split_object_path(&path)?;
    let url_path = format!("/api/files/{}/{}", bucket, key);
    validate_signature(&state, &url_path, &Method::PUT, &params)?;

    let file_path = resolve_object_path(&state.config.storage_root, bucket, key)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let Some(parent) = file_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let stream = body.into_data_stream().map_err(std::io::Error::other);
    let mut reader = StreamReader::new(stream);

    let mut file = tokio::fs::File::create(&file_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create {}: {}", file_path.display(), e)))?;

    tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write {}: {}", file_path.display(), e)))?;

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to flush {}: {}", file_path.display(), e)))?;

    Ok(Json(json!({ "success": true })))
}

/// `GET /api/files/{bucket}/{key}` — stream a stored object back to a
/// signed download URL.
pub async fn get_object(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<SignedParams>,
) -> Result<Response, AppError> {
    let (bucket, key) = split_object_path(&path)?;
    let url_path = format!("/api/files/{}/{}", bucket, key);
    validate_signature(&state, &url_path, &Method::GET, &params)?;

    let file_path = resolve_object_path(&state.config.storage_root, bucket, key)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let file = match tokio::fs::File::open(&file_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".to_string()));
        }
        Err(e) => {
            return Err(AppError::Internal(format!(
                "Failed to open {}: {}",
                file_path.display(),
                e
            )));
        }
    };

    let content_length = file.metadata().await.ok().map(|m| m.len());
    let content_type = content_type_for(key);

    let body = Body::from_stream(ReaderStream::new(file));
    let mut response = ([(header::CONTENT_TYPE, content_type)], body).into_response();

    if let Some(len) = content_length
        && let Ok(h_val) = len.to_string().parse()
    {
        response.headers_mut().insert(header::CONTENT_LENGTH, h_val);
    }

    Ok(response)
}

/// Local storage keeps no per-object metadata, so the content type is
/// guessed from the key's extension.
fn content_type_for(key: &str) -> &'static str {
    let extension = key.split('.').next_back().unwrap_or("").to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_object_path() {
        assert_eq!(
            split_object_path("avatars/u1/a.png").unwrap(),
            ("avatars", "u1/a.png")
        );
        assert!(split_object_path("avatars").is_err());
        assert!(split_object_path("avatars/").is_err());
        assert!(split_object_path("/a.png").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("u1/a.png"), "image/png");
        assert_eq!(content_type_for("u1/a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("u1/archive"), "application/octet-stream");
    }
}
