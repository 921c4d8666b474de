//! One scrape run: session setup, per-subject paging, normalization,
//! aggregation and persistence.
//!
//! Subjects are paged strictly one after another over the single session.
//! A course is written inline the first time it is seen, so its document
//! exists before any of its sections link into it. Each section is then
//! written on its own task.
//! Rooms are only complete once every subject is paged, so they are written
//! last, through the dispatcher's bounded gate.

pub mod aggregate;
pub mod dispatch;

pub use aggregate::Aggregator;
pub use dispatch::{persist_course, persist_section, DispatchReport, Dispatcher, WriteCount};

use crate::banner::{
    normalize_section, DiagnosticSink, Normalized, ScrapeError, SessionClient, SubjectPager,
};
use crate::config::ScrapeConfig;
use crate::store::DocumentStore;
use futures::TryStreamExt;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Counters for a finished run.
#[derive(Debug, Clone, Default)]
pub struct ScrapeSummary {
    pub run_id: String,
    pub term: String,
    pub subjects: usize,
    pub pages: usize,
    pub records: usize,
    pub courses: usize,
    pub sections: usize,
    pub rooms: usize,
    pub writes: DispatchReport,
}

/// Correlation id for one run, e.g. `20260115T031500-3fa2c1`.
pub fn new_run_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..0x100_0000);
    format!("{}-{suffix:06x}", chrono::Utc::now().format("%Y%m%dT%H%M%S"))
}

/// Scrapes one term into `store`.
///
/// Any portal error aborts the run; in-flight writes are dropped with the
/// dispatcher. Write failures are only counted in the summary.
pub async fn run_scrape(
    config: &ScrapeConfig,
    store: Arc<dyn DocumentStore>,
    sink: &dyn DiagnosticSink,
) -> Result<ScrapeSummary, ScrapeError> {
    let run_id = new_run_id();
    let started = Instant::now();
    info!(run_id = %run_id, term = %config.term, "Starting scrape");

    let session = SessionClient::open(config, sink)
        .await?
        .select_term(&config.term)
        .await?;

    let subjects = if config.subjects.is_empty() {
        session.fetch_subjects().await?
    } else {
        config.subjects.clone()
    };
    info!(run_id = %run_id, subjects = subjects.len(), "Subjects to scrape");

    let aggregator = Aggregator::new();
    let mut course_writes = DispatchReport::default();
    let mut dispatcher = Dispatcher::new(store, config.room_writers);
    let mut summary = ScrapeSummary {
        run_id: run_id.clone(),
        term: config.term.clone(),
        subjects: subjects.len(),
        ..Default::default()
    };

    for (i, subject) in subjects.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(config.subject_delay).await;
        }

        info!(run_id = %run_id, subject = %subject, "Scraping subject");
        let pages =
            SubjectPager::new(&session, subject, config.page_size, config.page_delay).pages();
        futures::pin_mut!(pages);

        while let Some(batch) = pages.try_next().await? {
            summary.pages += 1;
            summary.records += batch.len();

            for raw in batch {
                let Normalized { course, section } = normalize_section(&raw);
                let store = dispatcher.store();

                if aggregator.observe(&course, &section) {
                    course_writes += persist_course(store.as_ref(), &course).await;
                }
                dispatcher.spawn(async move { persist_section(store.as_ref(), &section).await });
            }
        }
    }

    let mut writes = course_writes;
    writes += dispatcher.wait_all().await;

    let rooms = aggregator.take_rooms();
    info!(run_id = %run_id, rooms = rooms.len(), "Writing rooms");
    summary.rooms = rooms.len();
    dispatcher.dispatch_rooms(rooms).await;
    writes += dispatcher.wait_all().await;

    summary.courses = aggregator.course_count();
    summary.sections = aggregator.section_count();
    summary.writes = writes;

    info!(
        run_id = %run_id,
        subjects = summary.subjects,
        pages = summary.pages,
        records = summary.records,
        courses = summary.courses,
        sections = summary.sections,
        rooms = summary.rooms,
        failed_writes = writes.failures(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Scrape complete"
    );

    Ok(summary)
}
