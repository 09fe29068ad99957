//! Health check endpoint.

use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use upgate_core::storage::Uploader;

use crate::AppState;

/// Health check handler.
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Healthy!",
    )
}

/// Creates health check routes.
pub fn routes<U: Uploader>() -> Router<AppState<U>> {
    Router::new().route("/_health", get(health_check))
}
