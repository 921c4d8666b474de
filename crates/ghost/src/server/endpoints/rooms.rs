//! Room schedules, the main read path of the map frontend.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::model::Room;
use crate::server::types::ApiErrorType;
use crate::store::catalog;
use crate::types::AppState;

/// Room listings change once per scrape.
const ROOMS_CACHE_CONTROL: &str = "public, max-age=3600";

/// Query parameters for `GET /api/rooms`.
///
/// `day` and `time` are kept as strings so that garbage values are ignored
/// instead of rejected.
#[derive(Debug, Default, Deserialize)]
pub struct RoomQuery {
    pub building: Option<String>,
    /// 0 = Sunday ... 6 = Saturday
    pub day: Option<String>,
    /// Minutes since midnight
    pub time: Option<String>,
}

impl RoomQuery {
    fn building(&self) -> Option<&str> {
        self.building.as_deref().filter(|b| !b.is_empty())
    }

    fn day(&self) -> Option<u8> {
        self.day.as_deref().and_then(|d| d.trim().parse().ok())
    }

    fn time(&self) -> Option<u16> {
        self.time.as_deref().and_then(|t| t.trim().parse().ok())
    }
}

/// Narrows a room's schedule to one day and, optionally, one instant.
///
/// `time` has no effect without `day`.
pub fn filter_schedule(room: &mut Room, day: Option<u8>, time: Option<u16>) {
    let Some(day) = day else {
        return;
    };

    room.schedule
        .retain(|m| m.day == day && time.map_or(true, |t| m.is_ongoing_at(t)));
}

/// GET /api/rooms?building=HORIZN&day=1&time=630
/// Returns rooms with their (optionally filtered) weekly schedule
pub async fn get_rooms(
    Query(query): Query<RoomQuery>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /api/rooms {:?}", query);

    let rooms = match catalog::load_rooms(s.store.as_ref()).await {
        Ok(rooms) => rooms,
        Err(e) => {
            error!(error = %e, "Failed to read rooms");
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error reading database",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let (day, time) = (query.day(), query.time());
    let rooms: Vec<Room> = rooms
        .into_iter()
        .filter(|r| query.building().map_or(true, |b| r.building == b))
        .map(|mut r| {
            filter_schedule(&mut r, day, time);
            r
        })
        .collect();

    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, ROOMS_CACHE_CONTROL)],
        Json(rooms),
    )
        .into_response()
}

/// GET /api/rooms/:room_id
pub async fn get_room(Path(room_id): Path<String>, State(s): State<Arc<AppState>>) -> Response {
    info!("GET /api/rooms/{}", room_id);

    match catalog::load_room(s.store.as_ref(), &room_id).await {
        Ok(Some(room)) => (StatusCode::OK, Json(room)).into_response(),
        Ok(None) => {
            ApiErrorType::from((StatusCode::NOT_FOUND, "Room not found", Some(room_id)))
                .into_response()
        }
        Err(e) => {
            error!(room_id = %room_id, error = %e, "Failed to read room");
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error reading database",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
