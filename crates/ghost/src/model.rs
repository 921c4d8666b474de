//! Domain entities produced by the normalizer and persisted as documents.

use crate::buildings;
use serde::{Deserialize, Serialize};

/// Location used when a meeting has neither a building nor a room.
pub const ONLINE_TBA: &str = "Online / TBA";

/// Shorter spelling of the unknown location, seen in older documents.
pub const TBA: &str = "TBA";

/// Instructor name used when a section lists no faculty.
pub const PROFESSOR_TBA: &str = "TBA";

/// Replaces the whitespace between building and room in a room id.
pub const ROOM_ID_DELIMITER: &str = "_";

/// Returns true if the location does not denote a physical room.
pub fn is_sentinel_location(location: &str) -> bool {
    let location = location.trim();
    location.is_empty() || location == ONLINE_TBA || location == TBA
}

/// Builds the room document id for a location, e.g. `HORIZN 2014` -> `HORIZN_2014`.
pub fn room_id(location: &str) -> String {
    location
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(ROOM_ID_DELIMITER)
}

/// High-level course metadata, e.g. `CS110`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub department: String,
    pub code: String,
    pub title: String,
    /// CRNs of the sections linked to this course.
    #[serde(default)]
    pub section_ids: Vec<String>,
}

impl Course {
    /// Course identity: subject followed by course number.
    pub fn identity(subject: &str, course_number: &str) -> String {
        format!("{}{}", subject.trim(), course_number.trim())
    }
}

/// One section offering, keyed by its course reference number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub course_id: String,
    pub section: String,
    pub professor: String,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

/// A weekly meeting occurrence.
///
/// `day` is 0 for Sunday through 6 for Saturday. Times are minutes since
/// midnight and always satisfy `start_time < end_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub day: u8,
    pub start_time: u16,
    pub end_time: u16,
    pub location: String,
    /// Sections holding this meeting; only filled in on room schedules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<MeetingInfo>,
}

impl Meeting {
    /// Returns true if the meeting takes place in a physical room.
    pub fn is_in_room(&self) -> bool {
        !is_sentinel_location(&self.location)
    }

    /// Returns true if the meeting is ongoing at `minute` (inclusive bounds).
    pub fn is_ongoing_at(&self, minute: u16) -> bool {
        self.start_time <= minute && minute <= self.end_time
    }
}

/// Back-reference from a room's meeting to the section that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingInfo {
    pub id: String,
    pub course_id: String,
    pub section: String,
    pub professor: String,
}

impl From<&Section> for MeetingInfo {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id.clone(),
            course_id: section.course_id.clone(),
            section: section.section.clone(),
            professor: section.professor.clone(),
        }
    }
}

/// A classroom with its aggregated weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    /// Building code, e.g. `HORIZN`.
    pub building: String,
    /// Display name, e.g. `Horizon Hall`; absent for unknown codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    pub number: String,
    #[serde(default)]
    pub schedule: Vec<Meeting>,
}

impl Room {
    /// Creates an empty room for a non-sentinel location.
    pub fn at(location: &str) -> Self {
        let mut parts = location.split_whitespace();
        let building = parts.next().unwrap_or_default().to_string();
        let number = parts.collect::<Vec<_>>().join(" ");
        let building_name = buildings::lookup(&building).map(|info| info.name.to_string());

        Self {
            id: room_id(location),
            building,
            building_name,
            number,
            schedule: Vec::new(),
        }
    }
}
