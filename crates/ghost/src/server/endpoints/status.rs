use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::types::AppState;

/// GET /health
pub async fn get_health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    info!("GET /health");

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "started_at": s.started_at.to_rfc3339(),
        })),
    )
}

/// GET /
pub async fn get_root() -> impl IntoResponse {
    info!("GET /");

    Json(json!({
        "message": "ghost room occupancy API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
