use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::api::error::AppError;
use crate::services::storage::StorageBackend;
use crate::utils::validation::{is_valid_avatar_key, sanitize_filename};

/// Content types accepted for avatar uploads
const ALLOWED_AVATAR_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

#[derive(Deserialize)]
pub struct BoardCoverUploadRequest {
    pub board_public_id: String,
    pub filename: String,
    pub content_type: String,
}

#[derive(Deserialize)]
pub struct AvatarUploadRequest {
    pub filename: String,
    pub content_type: String,
}

#[derive(Serialize)]
pub struct UploadUrlResponse {
    pub url: String,
    pub key: String,
}

/// Issue a time-limited upload URL for a board cover image. The stored key
/// gets a random component, so concurrent uploads for one board never
/// collide on a path.
pub async fn board_cover_upload_url(
    State(state): State<AppState>,
    Json(req): Json<BoardCoverUploadRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    if req.board_public_id.is_empty()
        || !req
            .board_public_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::BadRequest("Invalid board id".to_string()));
    }

    if req.content_type.is_empty() {
        return Err(AppError::BadRequest("Missing content type".to_string()));
    }

    let filename =
        sanitize_filename(&req.filename).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let key = format!(
        "board-covers/{}/{}-{}",
        req.board_public_id,
        Uuid::new_v4(),
        filename
    );

    let url = state
        .storage
        .generate_upload_url(
            &state.config.attachments_bucket,
            &key,
            &req.content_type,
            state.config.url_ttl_secs,
        )
        .await?;

    Ok(Json(UploadUrlResponse { url, key }))
}

/// Issue a time-limited upload URL for a user avatar. The key is
/// client-proposed and validated strictly instead of being rewritten.
pub async fn avatar_upload_url(
    State(state): State<AppState>,
    Json(req): Json<AvatarUploadRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    if !ALLOWED_AVATAR_CONTENT_TYPES.contains(&req.content_type.as_str()) {
        return Err(AppError::BadRequest("Invalid content type".to_string()));
    }

    if !is_valid_avatar_key(&req.filename) {
        return Err(AppError::BadRequest("Invalid filename".to_string()));
    }

    let url = state
        .storage
        .generate_upload_url(
            &state.config.avatars_bucket,
            &req.filename,
            &req.content_type,
            state.config.url_ttl_secs,
        )
        .await?;

    Ok(Json(UploadUrlResponse {
        url,
        key: req.filename,
    }))
}
