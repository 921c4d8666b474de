use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::server::endpoints::{buildings, courses, rooms, status};
use crate::types::AppState;

mod endpoints;
mod types;

pub use endpoints::rooms::{filter_schedule, RoomQuery};
pub use types::ApiErrorType;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/rooms", get(rooms::get_rooms))
        .route("/rooms/:room_id", get(rooms::get_room))
        .route("/buildings", get(buildings::get_buildings))
        .route(
            "/courses/:course_id/sections",
            get(courses::get_course_sections),
        );

    Router::new()
        .route("/", get(status::get_root))
        .route("/health", get(status::get_health))
        .nest("/api", api_router)
        .with_state(app_state)
}
