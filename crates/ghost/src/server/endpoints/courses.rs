use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::server::types::ApiErrorType;
use crate::store::catalog;
use crate::types::AppState;

/// GET /api/courses/:course_id/sections
/// Returns every section linked to a course
pub async fn get_course_sections(
    Path(course_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /api/courses/{}/sections", course_id);

    match catalog::sections_for_course(s.store.as_ref(), &course_id).await {
        Ok(Some(sections)) => (StatusCode::OK, Json(sections)).into_response(),
        Ok(None) => ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Course not found",
            Some(course_id),
        ))
        .into_response(),
        Err(e) => {
            error!(course_id = %course_id, error = %e, "Failed to read course sections");
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read course sections",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
