//! The job feed: accumulated postings, the page cursor and the fetching flag.
//!
//! All state changes go through [`JobFeed::request_next_page`] (split into
//! [`JobFeed::begin_fetch`] and [`JobFeed::finish_fetch`]) and
//! [`JobFeed::set_filter_criteria`]. Renderers only ever see a
//! [`FeedSnapshot`].

use crate::filter::{FilterCriteria, FilterField, filtered_view};
use crate::job::{JobPage, JobPosting};
use crate::source::{FetchError, JobSource, PageRequest};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// This many postings were appended.
    Appended(usize),
    /// The page came back empty; nothing changed.
    Empty,
    /// A fetch was already in flight; no request was issued.
    Busy,
    /// The completion did not belong to the fetch in flight and was dropped.
    Stale,
}

#[derive(Debug)]
pub struct JobFeed {
    page_size: u32,
    accumulated: Vec<JobPosting>,
    criteria: FilterCriteria,
    next_offset: u64,
    in_flight: Option<PageRequest>,
    end_reached: bool,
    total_available: Option<u64>,
}

/// Read-only view of the feed handed to the rendering layer.
#[derive(Clone, Copy, Debug)]
pub struct FeedSnapshot<'a> {
    pub accumulated: &'a [JobPosting],
    pub criteria: &'a FilterCriteria,
    pub next_offset: u64,
    pub fetching: bool,
    pub end_reached: bool,
    pub total_available: Option<u64>,
}

impl FeedSnapshot<'_> {
    /// Filtered postings paired with their index in the accumulated list.
    pub fn visible(&self) -> Vec<(usize, &JobPosting)> {
        self.accumulated
            .iter()
            .enumerate()
            .filter(|(_, job)| self.criteria.matches(job))
            .collect()
    }
}

impl Default for JobFeed {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl JobFeed {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            accumulated: Vec::new(),
            criteria: FilterCriteria::default(),
            next_offset: 0,
            in_flight: None,
            end_reached: false,
            total_available: None,
        }
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn accumulated(&self) -> &[JobPosting] {
        &self.accumulated
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Moves idle -> fetching and returns the request to issue, or `None`
    /// when a fetch is already in flight.
    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let request = PageRequest {
            limit: self.page_size,
            offset: self.next_offset,
        };
        self.in_flight = Some(request);
        Some(request)
    }

    /// Moves fetching -> idle, applying the result of `request`.
    ///
    /// The cursor advances by the requested page size, and only for a
    /// non-empty page. Errors are handed back untouched.
    pub fn finish_fetch(
        &mut self,
        request: PageRequest,
        result: Result<JobPage, FetchError>,
    ) -> Result<PageOutcome, FetchError> {
        if self.in_flight != Some(request) {
            tracing::debug!(offset = request.offset, "dropping stale page");
            return Ok(PageOutcome::Stale);
        }
        self.in_flight = None;

        let page = result?;
        if page.total_count.is_some() {
            self.total_available = page.total_count;
        }
        if page.jd_list.is_empty() {
            self.end_reached = true;
            return Ok(PageOutcome::Empty);
        }

        let count = page.jd_list.len();
        self.accumulated.extend(page.jd_list);
        self.next_offset += u64::from(request.limit);
        self.end_reached = false;
        Ok(PageOutcome::Appended(count))
    }

    pub fn request_next_page<S: JobSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<PageOutcome, FetchError> {
        let Some(request) = self.begin_fetch() else {
            return Ok(PageOutcome::Busy);
        };
        let result = source.fetch_page(&request);
        self.finish_fetch(request, result)
    }

    /// Reaction to the sentinel entering view.
    pub fn on_sentinel_visible<S: JobSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<PageOutcome, FetchError> {
        if self.is_fetching() {
            return Ok(PageOutcome::Busy);
        }
        self.request_next_page(source)
    }

    /// Merges criteria by name. Fetched postings and the cursor are kept.
    pub fn set_filter_criteria<I: IntoIterator<Item = FilterField>>(&mut self, fields: I) {
        self.criteria.merge(fields);
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    pub fn filtered_view(&self) -> Vec<&JobPosting> {
        filtered_view(&self.accumulated, &self.criteria)
    }

    pub fn snapshot(&self) -> FeedSnapshot<'_> {
        FeedSnapshot {
            accumulated: &self.accumulated,
            criteria: &self.criteria,
            next_offset: self.next_offset,
            fetching: self.is_fetching(),
            end_reached: self.end_reached,
            total_available: self.total_available,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::job::posting;

    /// Replays scripted pages and records every request it receives.
    pub(crate) struct ScriptedSource {
        responses: RefCell<VecDeque<Result<JobPage, FetchError>>>,
        pub requests: RefCell<Vec<PageRequest>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(responses: Vec<Result<JobPage, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn offsets(&self) -> Vec<u64> {
            self.requests.borrow().iter().map(|r| r.offset).collect()
        }
    }

    impl JobSource for ScriptedSource {
        fn fetch_page(&self, request: &PageRequest) -> Result<JobPage, FetchError> {
            self.requests.borrow_mut().push(*request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(page(vec![])))
        }
    }

    pub(crate) fn page(jobs: Vec<JobPosting>) -> JobPage {
        JobPage {
            jd_list: jobs,
            total_count: None,
        }
    }

    fn jobs(prefix: &str, n: usize) -> Vec<JobPosting> {
        (0..n)
            .map(|i| posting(&format!("{prefix}{i}"), "engineer", "remote"))
            .collect()
    }

    fn status_error() -> FetchError {
        FetchError::Status { status: 500 }
    }

    #[test]
    fn test_first_page_requests_offset_zero() {
        let source = ScriptedSource::new(vec![Ok(page(jobs("a", 3)))]);
        let mut feed = JobFeed::new(10);

        let outcome = feed.request_next_page(&source).unwrap();

        assert_eq!(outcome, PageOutcome::Appended(3));
        assert_eq!(
            *source.requests.borrow(),
            vec![PageRequest {
                limit: 10,
                offset: 0
            }]
        );
        assert!(!feed.is_fetching());
    }

    #[test]
    fn test_offset_advances_by_page_size_not_returned_count() {
        let source = ScriptedSource::new(vec![
            Ok(page(jobs("a", 10))),
            Ok(page(jobs("b", 4))),
            Ok(page(jobs("c", 7))),
        ]);
        let mut feed = JobFeed::new(10);

        for _ in 0..3 {
            feed.request_next_page(&source).unwrap();
        }

        assert_eq!(feed.next_offset(), 30);
        assert_eq!(feed.accumulated().len(), 21);
        assert_eq!(source.offsets(), vec![0, 10, 20]);
    }

    #[test]
    fn test_pages_append_in_arrival_order() {
        let source = ScriptedSource::new(vec![Ok(page(jobs("a", 2))), Ok(page(jobs("b", 2)))]);
        let mut feed = JobFeed::new(2);
        feed.request_next_page(&source).unwrap();
        feed.request_next_page(&source).unwrap();

        let names: Vec<&str> = feed
            .accumulated()
            .iter()
            .map(|j| j.company_name.as_str())
            .collect();
        assert_eq!(names, vec!["a0", "a1", "b0", "b1"]);
    }

    #[test]
    fn test_second_request_while_fetching_is_a_noop() {
        let source = ScriptedSource::new(vec![Ok(page(jobs("a", 1)))]);
        let mut feed = JobFeed::new(10);

        let request = feed.begin_fetch().unwrap();
        assert!(feed.is_fetching());
        assert_eq!(feed.begin_fetch(), None);
        assert_eq!(feed.request_next_page(&source).unwrap(), PageOutcome::Busy);
        let outcome = feed.on_sentinel_visible(&source).unwrap();
        assert_eq!(outcome, PageOutcome::Busy);
        assert!(source.requests.borrow().is_empty());

        let outcome = feed.finish_fetch(request, Ok(page(jobs("x", 1)))).unwrap();
        assert_eq!(outcome, PageOutcome::Appended(1));
        assert!(!feed.is_fetching());
    }

    #[test]
    fn test_empty_page_leaves_cursor_and_idles() {
        let source = ScriptedSource::new(vec![Ok(page(jobs("a", 10))), Ok(page(vec![]))]);
        let mut feed = JobFeed::new(10);
        feed.request_next_page(&source).unwrap();

        let outcome = feed.request_next_page(&source).unwrap();

        assert_eq!(outcome, PageOutcome::Empty);
        assert_eq!(feed.next_offset(), 10);
        assert!(!feed.is_fetching());
        assert!(feed.snapshot().end_reached);
    }

    #[test]
    fn test_sentinel_after_empty_page_fetches_again() {
        let source = ScriptedSource::new(vec![Ok(page(vec![])), Ok(page(jobs("late", 2)))]);
        let mut feed = JobFeed::new(10);
        assert_eq!(feed.request_next_page(&source).unwrap(), PageOutcome::Empty);

        let outcome = feed.on_sentinel_visible(&source).unwrap();

        assert_eq!(outcome, PageOutcome::Appended(2));
        assert!(!feed.snapshot().end_reached);
        assert_eq!(source.offsets(), vec![0, 0]);
    }

    #[test]
    fn test_failure_is_returned_and_cursor_kept() {
        let source = ScriptedSource::new(vec![Ok(page(jobs("a", 10))), Err(status_error())]);
        let mut feed = JobFeed::new(10);
        feed.request_next_page(&source).unwrap();

        let err = feed.request_next_page(&source).unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500 }));
        assert_eq!(feed.next_offset(), 10);
        assert_eq!(feed.accumulated().len(), 10);
        assert!(!feed.is_fetching());
    }

    #[test]
    fn test_malformed_response_keeps_cursor() {
        let decode = serde_json::from_str::<JobPage>("{}").unwrap_err();
        let source = ScriptedSource::new(vec![Err(FetchError::Decode(decode))]);
        let mut feed = JobFeed::new(10);

        assert!(feed.request_next_page(&source).is_err());
        assert_eq!(feed.next_offset(), 0);
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut feed = JobFeed::new(10);
        let stale = PageRequest {
            limit: 10,
            offset: 40,
        };

        let outcome = feed.finish_fetch(stale, Ok(page(jobs("s", 3)))).unwrap();
        assert_eq!(outcome, PageOutcome::Stale);
        assert!(feed.accumulated().is_empty());

        let current = feed.begin_fetch().unwrap();
        let outcome = feed.finish_fetch(stale, Ok(page(jobs("s", 3)))).unwrap();
        assert_eq!(outcome, PageOutcome::Stale);
        assert!(feed.is_fetching());
        feed.finish_fetch(current, Ok(page(jobs("c", 1)))).unwrap();
        assert_eq!(feed.accumulated().len(), 1);
    }

    #[test]
    fn test_filter_changes_do_not_touch_list_or_cursor() {
        let source = ScriptedSource::new(vec![Ok(page(jobs("a", 10)))]);
        let mut feed = JobFeed::new(10);
        feed.request_next_page(&source).unwrap();

        feed.set_filter_criteria([FilterField::Company(Some("a3".to_string()))]);

        assert_eq!(feed.accumulated().len(), 10);
        assert_eq!(feed.next_offset(), 10);
        assert_eq!(feed.filtered_view().len(), 1);
        assert_eq!(source.requests.borrow().len(), 1);

        feed.clear_filters();
        assert_eq!(feed.filtered_view().len(), 10);
    }

    #[test]
    fn test_example_scenario_experience_ceiling() {
        let mut acme = posting("Acme", "Backend Engineer", "remote");
        acme.min_exp = Some(2);
        acme.min_jd_salary = Some(50);
        let mut globex = posting("Globex", "Frontend Dev", "remote");
        globex.min_exp = Some(5);
        globex.min_jd_salary = Some(30);
        let source = ScriptedSource::new(vec![Ok(page(vec![acme, globex]))]);
        let mut feed = JobFeed::new(10);
        feed.request_next_page(&source).unwrap();

        feed.set_filter_criteria([FilterField::Experience(Some(3))]);

        let view = feed.filtered_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].company_name, "Acme");
    }

    #[test]
    fn test_snapshot_visible_keeps_accumulated_indices() {
        let source = ScriptedSource::new(vec![Ok(JobPage {
            jd_list: jobs("a", 5),
            total_count: Some(42),
        })]);
        let mut feed = JobFeed::new(10);
        feed.request_next_page(&source).unwrap();
        feed.set_filter_criteria([FilterField::Company(Some("a4".to_string()))]);

        let snapshot = feed.snapshot();
        let visible = snapshot.visible();

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].0, 4);
        assert_eq!(snapshot.total_available, Some(42));
        assert!(!snapshot.fetching);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let feed = JobFeed::new(0);
        assert_eq!(feed.page_size(), 1);
    }
}
