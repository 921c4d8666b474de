//! Per-subject pagination over Banner's stateful search.
//!
//! Banner accumulates search criteria per session, not per subject, so a
//! pager always resets the search before its first page. Without the reset
//! the previous subject's results leak into the next one.

use super::error::ScrapeError;
use super::types::{RawSection, SearchResponse};
use async_trait::async_trait;
use futures::Stream;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The two search calls a pager needs from a session.
#[async_trait]
pub trait SearchPortal: Send + Sync {
    /// Clears the search criteria held by the server-side session.
    async fn reset_search(&self) -> Result<(), ScrapeError>;

    /// Fetches one page of results for `subject`.
    async fn search_page(
        &self,
        subject: &str,
        offset: u32,
        page_size: u32,
    ) -> Result<SearchResponse, ScrapeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagerState {
    /// Search not reset yet; nothing fetched
    Fresh,
    /// At least one page fetched and more may follow
    Paging,
    /// Exhausted
    Done,
}

/// Walks every result page of one subject, in order.
///
/// Paging position lives only in the pager, so a pager cannot be restarted.
pub struct SubjectPager<'a, P: SearchPortal + ?Sized> {
    portal: &'a P,
    subject: String,
    page_size: u32,
    page_delay: Duration,
    offset: u32,
    state: PagerState,
}

impl<'a, P: SearchPortal + ?Sized> SubjectPager<'a, P> {
    pub fn new(portal: &'a P, subject: &str, page_size: u32, page_delay: Duration) -> Self {
        Self {
            portal,
            subject: subject.to_string(),
            page_size: page_size.max(1),
            page_delay,
            offset: 0,
            state: PagerState::Fresh,
        }
    }

    /// Returns the next batch of records, or `None` once the subject is exhausted.
    ///
    /// Stops on an empty page. Otherwise the batch is returned and the pager
    /// is exhausted once the offset reaches the reported total, which covers
    /// a first page reporting a zero total.
    pub async fn next_page(&mut self) -> Result<Option<Vec<RawSection>>, ScrapeError> {
        match self.state {
            PagerState::Done => return Ok(None),
            PagerState::Fresh => {
                self.portal.reset_search().await?;
                self.state = PagerState::Paging;
            }
            PagerState::Paging => tokio::time::sleep(self.page_delay).await,
        }

        let first_page = self.offset == 0;
        debug!(subject = %self.subject, offset = self.offset, "Fetching page");

        let response = self
            .portal
            .search_page(&self.subject, self.offset, self.page_size)
            .await?;

        if response.data.is_empty() {
            self.state = PagerState::Done;
            return Ok(None);
        }

        self.offset += self.page_size;
        if self.offset >= response.total_count {
            self.state = PagerState::Done;
        }

        if first_page && response.total_count == 0 {
            warn!(
                subject = %self.subject,
                records = response.data.len(),
                "First page reports a zero total, keeping its records and stopping"
            );
        }

        info!(
            subject = %self.subject,
            records = response.data.len(),
            total_count = response.total_count,
            "Fetched page"
        );

        Ok(Some(response.data))
    }

    /// Consumes the pager into a stream of batches.
    pub fn pages(self) -> impl Stream<Item = Result<Vec<RawSection>, ScrapeError>> + 'a
    where
        P: 'a,
    {
        futures::stream::try_unfold(self, |mut pager| async move {
            Ok(pager.next_page().await?.map(|batch| (batch, pager)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::types::RawSection;
    use futures::TryStreamExt;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// In-process portal returning `total` records in pages.
    struct FakePortal {
        total: u32,
        /// Reported total; differs from `total` to simulate a lying server
        reported_total: u32,
        fail_at_offset: Option<u32>,
        calls: Mutex<Vec<String>>,
    }

    impl FakePortal {
        fn new(total: u32) -> Self {
            Self {
                total,
                reported_total: total,
                fail_at_offset: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchPortal for FakePortal {
        async fn reset_search(&self) -> Result<(), ScrapeError> {
            self.calls.lock().unwrap().push("reset".to_string());
            Ok(())
        }

        async fn search_page(
            &self,
            subject: &str,
            offset: u32,
            page_size: u32,
        ) -> Result<SearchResponse, ScrapeError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{subject}@{offset}"));

            if self.fail_at_offset == Some(offset) {
                return Err(ScrapeError::unexpected_status(
                    "searchResults",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "boom",
                ));
            }

            let end = (offset + page_size).min(self.total);
            let data = (offset..end)
                .map(|i| RawSection {
                    course_reference_number: i.to_string(),
                    subject: subject.to_string(),
                    ..Default::default()
                })
                .collect();

            Ok(SearchResponse {
                success: true,
                total_count: self.reported_total,
                data,
            })
        }
    }

    async fn drain(portal: &FakePortal, subject: &str) -> Result<Vec<usize>, ScrapeError> {
        let mut pager = SubjectPager::new(portal, subject, 50, Duration::ZERO);
        let mut sizes = Vec::new();
        while let Some(batch) = pager.next_page().await? {
            sizes.push(batch.len());
        }
        Ok(sizes)
    }

    #[tokio::test]
    async fn test_pages_until_total_reached() {
        let portal = FakePortal::new(120);
        let sizes = drain(&portal, "CS").await.unwrap();

        assert_eq!(sizes, vec![50, 50, 20]);
        assert_eq!(portal.calls(), vec!["reset", "CS@0", "CS@50", "CS@100"]);
    }

    #[tokio::test]
    async fn test_exact_multiple_stops_without_extra_fetch() {
        let portal = FakePortal::new(100);
        let sizes = drain(&portal, "MATH").await.unwrap();

        assert_eq!(sizes, vec![50, 50]);
        assert_eq!(portal.calls(), vec!["reset", "MATH@0", "MATH@50"]);
    }

    #[tokio::test]
    async fn test_empty_subject() {
        let portal = FakePortal::new(0);
        let sizes = drain(&portal, "ZULU").await.unwrap();

        assert!(sizes.is_empty());
        assert_eq!(portal.calls(), vec!["reset", "ZULU@0"]);
    }

    #[tokio::test]
    async fn test_zero_total_keeps_first_page_and_stops() {
        let mut portal = FakePortal::new(10);
        portal.reported_total = 0;
        let sizes = drain(&portal, "CS").await.unwrap();

        assert_eq!(sizes, vec![10]);
        assert_eq!(portal.calls(), vec!["reset", "CS@0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_pages() {
        let portal = FakePortal::new(120);
        let delay = Duration::from_millis(500);
        let mut pager = SubjectPager::new(&portal, "CS", 50, delay);

        let started = tokio::time::Instant::now();
        let mut pages = 0;
        while pager.next_page().await.unwrap().is_some() {
            pages += 1;
        }

        assert_eq!(pages, 3);
        // No wait before the first page, one before each following page
        assert!(started.elapsed() >= delay * 2);
        assert!(started.elapsed() < delay * 3);
    }

    #[tokio::test]
    async fn test_empty_page_stops_before_total() {
        let mut portal = FakePortal::new(60);
        portal.reported_total = 500;
        let sizes = drain(&portal, "CS").await.unwrap();

        assert_eq!(sizes, vec![50, 10]);
        assert_eq!(portal.calls(), vec!["reset", "CS@0", "CS@50", "CS@100"]);
    }

    #[tokio::test]
    async fn test_failed_page_is_fatal() {
        let mut portal = FakePortal::new(120);
        portal.fail_at_offset = Some(50);
        let err = drain(&portal, "CS").await.unwrap_err();

        assert!(matches!(err, ScrapeError::UnexpectedStatus { .. }));
        assert_eq!(portal.calls(), vec!["reset", "CS@0", "CS@50"]);
    }

    #[tokio::test]
    async fn test_done_pager_does_not_fetch_again() {
        let portal = FakePortal::new(10);
        let mut pager = SubjectPager::new(&portal, "CS", 50, Duration::ZERO);

        assert!(pager.next_page().await.unwrap().is_some());
        assert!(pager.next_page().await.unwrap().is_none());
        assert!(pager.next_page().await.unwrap().is_none());
        assert_eq!(portal.calls(), vec!["reset", "CS@0"]);
    }

    #[tokio::test]
    async fn test_stream_yields_every_batch() {
        let portal = FakePortal::new(120);
        let pager = SubjectPager::new(&portal, "CS", 50, Duration::ZERO);

        let batches: Vec<Vec<RawSection>> = pager.pages().try_collect().await.unwrap();
        let total: usize = batches.iter().map(Vec::len).sum();
        assert_eq!(batches.len(), 3);
        assert_eq!(total, 120);
    }
}
