//! Persistence of normalized entities with bounded room writes.

use crate::model::{Course, Room, Section};
use crate::store::{catalog, DocumentStore, StoreError};
use std::future::Future;
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, warn};

/// Succeeded and failed writes for one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCount {
    pub ok: usize,
    pub failed: usize,
}

impl WriteCount {
    fn record(&mut self, result: &Result<(), StoreError>) {
        match result {
            Ok(()) => self.ok += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl AddAssign for WriteCount {
    fn add_assign(&mut self, rhs: Self) {
        self.ok += rhs.ok;
        self.failed += rhs.failed;
    }
}

/// Outcome of every write dispatched so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub courses: WriteCount,
    pub sections: WriteCount,
    pub rooms: WriteCount,
}

impl DispatchReport {
    pub fn failures(&self) -> usize {
        self.courses.failed + self.sections.failed + self.rooms.failed
    }
}

impl AddAssign for DispatchReport {
    fn add_assign(&mut self, rhs: Self) {
        self.courses += rhs.courses;
        self.sections += rhs.sections;
        self.rooms += rhs.rooms;
    }
}

/// Writes a course document.
///
/// Must complete before any section of the course is saved, or the section
/// cannot be linked. Failures are logged and counted, never returned.
pub async fn persist_course(store: &dyn DocumentStore, course: &Course) -> DispatchReport {
    let mut report = DispatchReport::default();

    let result = catalog::save_course(store, course).await;
    if let Err(e) = &result {
        warn!(course_id = %course.id, error = %e, "Failed to write course");
    }
    report.courses.record(&result);

    report
}

/// Writes a section and links it into its course.
pub async fn persist_section(store: &dyn DocumentStore, section: &Section) -> DispatchReport {
    let mut report = DispatchReport::default();

    let result = catalog::save_section(store, section).await;
    if let Err(e) = &result {
        warn!(crn = %section.id, error = %e, "Failed to write section");
    }
    report.sections.record(&result);

    report
}

/// Tracks every in-flight write of a run.
///
/// Section writes are unbounded. Room writes go through a semaphore sized
/// by `room_writers`.
pub struct Dispatcher {
    store: Arc<dyn DocumentStore>,
    room_permits: Arc<Semaphore>,
    tasks: JoinSet<DispatchReport>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, room_writers: usize) -> Self {
        Self {
            store,
            room_permits: Arc::new(Semaphore::new(room_writers.max(1))),
            tasks: JoinSet::new(),
        }
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    /// Number of tasks not yet joined.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Spawns a unit of section work.
    pub fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = DispatchReport> + Send + 'static,
    {
        self.tasks.spawn(work);
    }

    /// Spawns one write per room, never more than `room_writers` at once.
    ///
    /// Waits for a free permit before each spawn, so this returns once the
    /// last room write has started.
    pub async fn dispatch_rooms(&mut self, rooms: Vec<Room>) {
        for room in rooms {
            let permit = match Arc::clone(&self.room_permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(error = %e, "Room write gate closed, dropping remaining rooms");
                    return;
                }
            };

            let store = Arc::clone(&self.store);
            self.tasks.spawn(async move {
                let result = catalog::save_room(store.as_ref(), &room).await;
                drop(permit);

                if let Err(e) = &result {
                    warn!(room_id = %room.id, error = %e, "Failed to write room");
                }

                let mut report = DispatchReport::default();
                report.rooms.record(&result);
                report
            });
        }
    }

    /// Waits for every dispatched task and sums their reports.
    pub async fn wait_all(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(task_report) => report += task_report,
                Err(e) => error!(error = %e, "Write task panicked or was cancelled"),
            }
        }

        report
    }
}
