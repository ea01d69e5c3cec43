pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::StorageConfig;
use crate::services::signer::UrlSigner;
use crate::services::storage::StorageBackend;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageBackend>,
    pub signer: UrlSigner,
    pub config: StorageConfig,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageBackend>, config: StorageConfig) -> Self {
        Self {
            storage,
            signer: UrlSigner::new(&config),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/files/*path",
            get(api::handlers::files::get_object).put(api::handlers::files::put_object),
        )
        .route(
            "/api/upload/board-cover",
            post(api::handlers::uploads::board_cover_upload_url),
        )
        .route(
            "/api/upload/avatar",
            post(api::handlers::uploads::avatar_upload_url),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_upload_size,
        ))
        .with_state(state)
}
