//! API route definitions.

use axum::Router;
use upgate_core::storage::Uploader;

use crate::AppState;

pub mod health;
pub mod home;
pub mod upload;

/// Creates the router with all routes.
pub fn api_routes<U: Uploader>(upload_limit_bytes: usize) -> Router<AppState<U>> {
    Router::new()
        .merge(health::routes::<U>())
        .merge(home::routes::<U>())
        .merge(upload::routes::<U>(upload_limit_bytes))
}
