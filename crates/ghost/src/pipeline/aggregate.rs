//! Run-wide deduplication of courses and accumulation of room schedules.

use crate::model::{room_id, Course, Meeting, MeetingInfo, Room, Section};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Run-wide view of every observed section.
#[derive(Default)]
pub struct Aggregator {
    seen_courses: DashSet<String>,
    rooms: DashMap<String, Room>,
    sections: AtomicUsize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one normalized section.
    ///
    /// Returns true if this is the first time the course is seen in the run,
    /// i.e. the caller owns writing the course document. Every in-room meeting
    /// is appended to its room's schedule with a back-reference to `section`.
    pub fn observe(&self, course: &Course, section: &Section) -> bool {
        let first_sighting = self.seen_courses.insert(course.id.clone());
        self.sections.fetch_add(1, Ordering::Relaxed);

        for meeting in section.meetings.iter().filter(|m| m.is_in_room()) {
            let mut room = self
                .rooms
                .entry(room_id(&meeting.location))
                .or_insert_with(|| Room::at(&meeting.location));

            room.schedule.push(Meeting {
                label: vec![MeetingInfo::from(section)],
                ..meeting.clone()
            });
        }

        first_sighting
    }

    pub fn course_count(&self) -> usize {
        self.seen_courses.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.load(Ordering::Relaxed)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Drains the accumulated rooms, ordered by id.
    pub fn take_rooms(&self) -> Vec<Room> {
        let keys: Vec<String> = self.rooms.iter().map(|e| e.key().clone()).collect();
        let mut rooms: Vec<Room> = keys
            .into_iter()
            .filter_map(|k| self.rooms.remove(&k).map(|(_, room)| room))
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::{normalize_section, Normalized, RawSection};
    use crate::model::ONLINE_TBA;
    use crate::pipeline::{persist_course, persist_section};
    use crate::store::{DocumentStore, MemoryStore, COURSES};
    use std::sync::Arc;

    fn course(id: &str) -> Course {
        Course {
            id: id.to_string(),
            department: "CS".to_string(),
            code: id.trim_start_matches("CS").to_string(),
            title: "Title".to_string(),
            section_ids: Vec::new(),
        }
    }

    fn section(crn: &str, course_id: &str, locations: &[&str]) -> Section {
        Section {
            id: crn.to_string(),
            course_id: course_id.to_string(),
            section: "001".to_string(),
            professor: "Goof, Prof".to_string(),
            meetings: locations
                .iter()
                .map(|loc| Meeting {
                    day: 2,
                    start_time: 630,
                    end_time: 705,
                    location: loc.to_string(),
                    label: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_course_first_sighting_only_once() {
        let agg = Aggregator::new();
        let cs110 = course("CS110");

        assert!(agg.observe(&cs110, &section("1", "CS110", &[])));
        assert!(!agg.observe(&cs110, &section("2", "CS110", &[])));
        assert!(agg.observe(&course("CS211"), &section("3", "CS211", &[])));

        assert_eq!(agg.course_count(), 2);
        assert_eq!(agg.section_count(), 3);
    }

    #[test]
    fn test_sections_share_a_room() {
        let agg = Aggregator::new();
        agg.observe(&course("CS110"), &section("1", "CS110", &["HORIZN 2014"]));
        agg.observe(&course("CS211"), &section("2", "CS211", &["HORIZN 2014"]));

        let rooms = agg.take_rooms();
        assert_eq!(rooms.len(), 1);

        let room = &rooms[0];
        assert_eq!(room.id, "HORIZN_2014");
        assert_eq!(room.schedule.len(), 2);
        let crns: Vec<&str> = room
            .schedule
            .iter()
            .map(|m| m.label[0].id.as_str())
            .collect();
        assert!(crns.contains(&"1") && crns.contains(&"2"));
        assert_eq!(room.schedule[0].label.len(), 1);
    }

    #[test]
    fn test_sentinel_location_has_no_room() {
        let agg = Aggregator::new();
        agg.observe(
            &course("CS110"),
            &section("1", "CS110", &[ONLINE_TBA, "EXPL L003"]),
        );

        let rooms = agg.take_rooms();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, "EXPL_L003");
    }

    #[test]
    fn test_take_rooms_drains() {
        let agg = Aggregator::new();
        agg.observe(&course("CS110"), &section("1", "CS110", &["B 2", "A 1"]));

        let ids: Vec<String> = agg.take_rooms().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["A_1", "B_2"]);
        assert_eq!(agg.room_count(), 0);
    }

    #[tokio::test]
    async fn test_differing_titles_write_one_course() {
        let raw = |crn: &str, title: &str| RawSection {
            course_reference_number: crn.to_string(),
            subject: "CS".to_string(),
            course_number: "110".to_string(),
            sequence_number: "001".to_string(),
            course_title: title.to_string(),
            ..Default::default()
        };
        let agg = Aggregator::new();
        let store = MemoryStore::new();

        for record in [
            raw("10492", "Essentials of Computer Science"),
            raw("10493", "Essentials of CS (Honors)"),
        ] {
            let Normalized { course, section } = normalize_section(&record);
            if agg.observe(&course, &section) {
                persist_course(&store, &course).await;
            }
            persist_section(&store, &section).await;
        }

        assert_eq!(agg.course_count(), 1);
        let courses = store.list(COURSES).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0]["title"], "Essentials of Computer Science");
        assert_eq!(
            courses[0]["section_ids"],
            serde_json::json!(["10492", "10493"])
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_observers_elect_one_course_writer() {
        let agg = Arc::new(Aggregator::new());
        let mut handles = Vec::new();

        for i in 0..200 {
            let agg = agg.clone();
            handles.push(tokio::spawn(async move {
                let crn = i.to_string();
                agg.observe(&course("CS110"), &section(&crn, "CS110", &["HORIZN 2014"]))
            }));
        }

        let mut writers = 0;
        for handle in handles {
            if handle.await.unwrap() {
                writers += 1;
            }
        }

        assert_eq!(writers, 1);
        let rooms = agg.take_rooms();
        assert_eq!(rooms[0].schedule.len(), 200);
    }
}
