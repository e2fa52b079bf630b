//! Axum router wiring for the demo server.
//!
//! The metrics layer is applied with `Router::layer`, so it runs after
//! routing and sees `MatchedPath` for every matched route. Unmatched requests
//! reach it through the fallback with no route template.

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;

use httpmeter_core::ResponseError;

use crate::app_state::AppState;

pub fn build_router(state: AppState) -> Router {
    let layer = state.metrics_layer();
    Router::new()
        .route("/healthz", get(healthz))
        .route("/users/:id", get(get_user))
        .route("/fail", get(fail))
        .fallback(not_found)
        .layer(layer)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_user(Path(id): Path<String>) -> impl IntoResponse {
    Json(json!({ "id": id }))
}

/// Writes a 503 and reports why, so the request is metered as failed.
async fn fail() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Extension(ResponseError::new("backend pool exhausted")),
        "try again later",
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "no such route")
}
