//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - `GET /_health` liveness check
//! - `GET /` HTML upload form
//! - `POST /upload` multipart upload forwarded to the configured [`Uploader`]

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use upgate_core::storage::Uploader;
use upgate_shared::AppConfig;

/// Application state shared across handlers.
pub struct AppState<U> {
    /// Storage backend receiving uploads.
    pub uploader: Arc<U>,
    /// Configuration snapshot taken at startup.
    pub config: Arc<AppConfig>,
}

impl<U> AppState<U> {
    /// Creates the state from its parts.
    pub fn new(uploader: U, config: AppConfig) -> Self {
        Self {
            uploader: Arc::new(uploader),
            config: Arc::new(config),
        }
    }
}

// Manual impl: `U` itself need not be `Clone`.
impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            uploader: Arc::clone(&self.uploader),
            config: Arc::clone(&self.config),
        }
    }
}

/// Creates the main application router.
pub fn create_router<U: Uploader>(state: AppState<U>) -> Router {
    Router::new()
        .merge(routes::api_routes::<U>(state.config.upload_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
