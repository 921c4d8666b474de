//! Typed reads and writes of courses, sections and rooms.

use super::{DocumentStore, StoreError, COURSES, ROOMS, SECTIONS};
use crate::model::{Course, Room, Section};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Field on a course document listing its section ids.
pub const SECTION_IDS_FIELD: &str = "section_ids";

fn decode<T: DeserializeOwned>(collection: &str, id: &str, doc: Value) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(|e| StoreError::Malformed {
        collection: collection.to_string(),
        id: id.to_string(),
        message: e.to_string(),
    })
}

pub async fn save_course(store: &dyn DocumentStore, course: &Course) -> Result<(), StoreError> {
    store
        .put(COURSES, &course.id, serde_json::to_value(course)?)
        .await
}

/// Writes a section, then links it into its course.
///
/// A failed link is logged and not returned: the section itself is stored.
pub async fn save_section(store: &dyn DocumentStore, section: &Section) -> Result<(), StoreError> {
    store
        .put(SECTIONS, &section.id, serde_json::to_value(section)?)
        .await?;

    if let Err(e) = store
        .array_union(
            COURSES,
            &section.course_id,
            SECTION_IDS_FIELD,
            Value::String(section.id.clone()),
        )
        .await
    {
        warn!(
            section_id = %section.id,
            course_id = %section.course_id,
            error = %e,
            "Failed to link section into course"
        );
    }

    Ok(())
}

pub async fn save_room(store: &dyn DocumentStore, room: &Room) -> Result<(), StoreError> {
    store.put(ROOMS, &room.id, serde_json::to_value(room)?).await
}

pub async fn load_room(store: &dyn DocumentStore, id: &str) -> Result<Option<Room>, StoreError> {
    store
        .get(ROOMS, id)
        .await?
        .map(|doc| decode(ROOMS, id, doc))
        .transpose()
}

/// Every stored room, skipping documents that no longer decode.
pub async fn load_rooms(store: &dyn DocumentStore) -> Result<Vec<Room>, StoreError> {
    let rooms = store
        .list(ROOMS)
        .await?
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<Room>(doc) {
            Ok(room) => Some(room),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable room document");
                None
            }
        })
        .collect();
    Ok(rooms)
}

/// The sections linked to a course, in link order.
///
/// Returns `None` if the course does not exist. Linked ids with no stored
/// section are skipped.
pub async fn sections_for_course(
    store: &dyn DocumentStore,
    course_id: &str,
) -> Result<Option<Vec<Section>>, StoreError> {
    let Some(doc) = store.get(COURSES, course_id).await? else {
        return Ok(None);
    };
    let course: Course = decode(COURSES, course_id, doc)?;

    let docs = store.batch_get(SECTIONS, &course.section_ids).await?;
    let sections = course
        .section_ids
        .iter()
        .zip(docs)
        .filter_map(|(id, doc)| doc.map(|doc| decode(SECTIONS, id, doc)))
        .collect::<Result<Vec<Section>, _>>()?;

    Ok(Some(sections))
}
