use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use file_gateway::config::StorageConfig;
use file_gateway::services::storage::{LocalFilesystemBackend, StorageBackend};
use file_gateway::{AppState, create_app};
use http_body_util::BodyExt;
use tower::ServiceExt;

const BASE_URL: &str = "http://localhost:3000";

fn test_state(root: &Path) -> AppState {
    let config = StorageConfig {
        signing_secret: "integration-test-secret".to_string(),
        base_url: BASE_URL.to_string(),
        storage_root: root.to_path_buf(),
        ..Default::default()
    };
    let storage = Arc::new(LocalFilesystemBackend::new(&config));
    AppState::new(storage, config)
}

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> axum::http::Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_board_cover_upload_url_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = create_app(state.clone());

    let response = post_json(
        app.clone(),
        "/api/upload/board-cover",
        serde_json::json!({
            "board_public_id": "board-123",
            "filename": "my cover.png",
            "content_type": "image/png",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let key = json["key"].as_str().unwrap();
    assert!(key.starts_with("board-covers/board-123/"));
    assert!(key.ends_with("-my_cover.png"));

    // The issued URL must be accepted verbatim by the file endpoint
    let url = json["url"].as_str().unwrap();
    let put_uri = url.strip_prefix(BASE_URL).unwrap();
    assert!(put_uri.starts_with("/api/files/attachments/board-covers/"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(put_uri)
                .body(Body::from("cover-bytes"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // And a download URL for the same key round-trips the bytes
    let download_url = state
        .storage
        .generate_download_url("attachments", key, 3600)
        .await
        .unwrap();
    let get_uri = download_url.strip_prefix(BASE_URL).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(get_uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"cover-bytes");
}

#[tokio::test]
async fn test_board_cover_rejects_invalid_board_id() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = create_app(state);

    let response = post_json(
        app,
        "/api/upload/board-cover",
        serde_json::json!({
            "board_public_id": "../etc",
            "filename": "cover.png",
            "content_type": "image/png",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_avatar_upload_url() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = create_app(state);

    let response = post_json(
        app,
        "/api/upload/avatar",
        serde_json::json!({
            "filename": "a1b2c3-d4e5/avatar.png",
            "content_type": "image/png",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["key"], "a1b2c3-d4e5/avatar.png");
    assert!(
        json["url"]
            .as_str()
            .unwrap()
            .contains("/api/files/avatars/a1b2c3-d4e5/avatar.png")
    );
}

#[tokio::test]
async fn test_avatar_rejects_disallowed_content_type() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = create_app(state);

    let response = post_json(
        app,
        "/api/upload/avatar",
        serde_json::json!({
            "filename": "a1b2c3-d4e5/avatar.gif",
            "content_type": "image/gif",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_avatar_rejects_malformed_filename() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = create_app(state);

    let response = post_json(
        app,
        "/api/upload/avatar",
        serde_json::json!({
            "filename": "no-owner-segment.png",
            "content_type": "image/png",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
