//! Turns raw Banner search records into courses, sections and meetings.
//!
//! Everything here is pure. Malformed fields never fail the record; they
//! only drop the meeting block they belong to.

use super::types::{RawMeetingTime, RawSection};
use crate::model::{Course, Meeting, Section, ONLINE_TBA, PROFESSOR_TBA};

/// Output of normalizing one raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub course: Course,
    pub section: Section,
}

/// Normalizes one raw section record.
///
/// The course is built with an empty `section_ids` list; sections are linked
/// to it when they are persisted.
pub fn normalize_section(raw: &RawSection) -> Normalized {
    let course_id = Course::identity(&raw.subject, &raw.course_number);

    let course = Course {
        id: course_id.clone(),
        department: raw.subject.trim().to_string(),
        code: raw.course_number.trim().to_string(),
        title: raw.course_title.trim().to_string(),
        section_ids: Vec::new(),
    };

    let meetings = raw
        .meetings_faculty
        .iter()
        .filter_map(|mf| mf.meeting_time.as_ref())
        .flat_map(expand_meeting_time)
        .collect();

    let section = Section {
        id: raw.course_reference_number.trim().to_string(),
        course_id,
        section: raw.sequence_number.trim().to_string(),
        professor: resolve_professor(raw),
        meetings,
    };

    Normalized { course, section }
}

/// Decodes an `HHMM` string into minutes since midnight.
///
/// Anything other than four digits forming a valid clock time yields `None`.
pub fn parse_time(value: Option<&str>) -> Option<u16> {
    let value = value?.trim();
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: u16 = value[..2].parse().ok()?;
    let minutes: u16 = value[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    Some(hours * 60 + minutes)
}

/// Joins building and room, falling back to the online sentinel.
pub fn location(building: Option<&str>, room: Option<&str>) -> String {
    let joined = format!("{} {}", building.unwrap_or(""), room.unwrap_or(""));
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        ONLINE_TBA.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Day codes (Sunday = 0) whose flag is set on the block.
pub fn active_days(time: &RawMeetingTime) -> Vec<u8> {
    [
        time.sunday,
        time.monday,
        time.tuesday,
        time.wednesday,
        time.thursday,
        time.friday,
        time.saturday,
    ]
    .iter()
    .zip(0u8..)
    .filter_map(|(&active, day)| active.then_some(day))
    .collect()
}

/// Expands one meeting-time block into one meeting per active day.
///
/// Blocks with a missing or malformed time, or a non-positive duration,
/// produce nothing.
fn expand_meeting_time(time: &RawMeetingTime) -> Vec<Meeting> {
    let (Some(start_time), Some(end_time)) = (
        parse_time(time.begin_time.as_deref()),
        parse_time(time.end_time.as_deref()),
    ) else {
        return Vec::new();
    };

    if start_time >= end_time {
        return Vec::new();
    }

    let location = location(time.building.as_deref(), time.room.as_deref());

    active_days(time)
        .into_iter()
        .map(|day| Meeting {
            day,
            start_time,
            end_time,
            location: location.clone(),
            label: Vec::new(),
        })
        .collect()
}

/// First listed instructor, or the placeholder.
fn resolve_professor(raw: &RawSection) -> String {
    raw.faculty
        .first()
        .and_then(|f| f.display_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(PROFESSOR_TBA)
        .to_string()
}
