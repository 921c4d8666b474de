use axum::{response::IntoResponse, Json};
use tracing::info;

use crate::buildings;

/// GET /api/buildings
///
/// Static code to name and coordinates table, for the map.
pub async fn get_buildings() -> impl IntoResponse {
    info!("GET /api/buildings");
    Json(buildings::all())
}
