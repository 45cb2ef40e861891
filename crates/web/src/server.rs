use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::pages::PageRegistry;
use crate::routes;

/// Shared application state.
pub struct AppState {
    pub registry: Arc<PageRegistry>,
    pub metrics_handle: PrometheusHandle,
    /// Shown in the upload hint.
    pub max_image_bytes: u64,
}

/// Build the full router. `body_limit` caps form request bodies. Image
/// uploads are exempt: the upload handler streams them and keeps at most
/// `max_image_bytes` in memory.
pub fn build_router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(routes::home_handler))
        .route("/about", get(routes::about_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/flood-detection", get(routes::mount_handler))
        .route("/flood-detection/{id}", get(routes::page_handler))
        .route("/flood-detection/{id}/state", get(routes::state_handler))
        .route("/flood-detection/{id}/mode", post(routes::mode_handler))
        .route(
            "/flood-detection/{id}/coordinates",
            post(routes::coordinates_handler),
        )
        .route(
            "/flood-detection/{id}/image",
            post(routes::select_image_handler).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/flood-detection/{id}/image/preview",
            get(routes::image_preview_handler),
        )
        .route(
            "/flood-detection/{id}/image/remove",
            post(routes::remove_image_handler),
        )
        .route(
            "/flood-detection/{id}/image/analyze",
            post(routes::analyze_image_handler),
        )
        .route("/flood-detection/{id}/dismiss", post(routes::dismiss_handler))
        .route("/flood-detection/{id}/close", post(routes::close_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "healthy" })),
    )
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
