//! Listing search state and the query lifecycle around it.
//!
//! Every state change (filter update, clear, page change) commits
//! synchronously and hands back a [`PendingQuery`] tagged with a fresh
//! generation. The caller decides how to run it: inline with
//! [`ListingQueryEngine::run`], in the background with
//! [`ListingQueryEngine::dispatch`], or by hand through a
//! [`QueryExecutor`]. Only a completion whose generation matches the
//! latest one issued is allowed to touch the view.

use crate::advisory::{hints_for, AdvisoryHint, AdvisoryThresholds};
use crate::directory::RegionDirectory;
use crate::error::{FetchError, ValidationError};
use crate::fetch::ListingFetcher;
use crate::filters::{FilterState, FilterUpdate};
use crate::models::{Property, QueryResult};
use crate::query::ListingQuery;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub page_size: u32,
    pub request_timeout: Duration,
    pub thresholds: AdvisoryThresholds,
    /// Reject price updates that leave `min > max`
    pub strict_price_range: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_size: 6,
            request_timeout: Duration::from_secs(10),
            thresholds: AdvisoryThresholds::default(),
            strict_price_range: false,
        }
    }
}

/// What the listing page should currently show.
#[derive(Debug, Clone)]
pub enum ViewState {
    /// Nothing requested yet
    Idle,
    Loading {
        generation: u64,
    },
    /// Fetch failed. Recovery is `clear_filters`; there is no auto-retry.
    Error {
        message: String,
    },
    Empty {
        hints: Vec<AdvisoryHint>,
    },
    Success {
        properties: Vec<Property>,
        total: u64,
        total_pages: u64,
        fetched_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Idle,
    Loading,
    Error,
    Empty,
    Success,
}

impl ViewState {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewState::Idle => ViewKind::Idle,
            ViewState::Loading { .. } => ViewKind::Loading,
            ViewState::Error { .. } => ViewKind::Error,
            ViewState::Empty { .. } => ViewKind::Empty,
            ViewState::Success { .. } => ViewKind::Success,
        }
    }
}

/// A query that has been committed but not yet run.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    pub generation: u64,
    pub query: ListingQuery,
}

/// Result of running a [`PendingQuery`].
#[derive(Debug)]
pub struct CompletedQuery {
    pub generation: u64,
    pub query: ListingQuery,
    pub outcome: Result<QueryResult, FetchError>,
    pub fetched_at: DateTime<Utc>,
}

/// Runs pending queries against a fetcher with a deadline.
///
/// Cheap to clone; holds no engine state, so it can run on any task.
#[derive(Clone)]
pub struct QueryExecutor {
    fetcher: Arc<dyn ListingFetcher>,
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(fetcher: Arc<dyn ListingFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub async fn execute(&self, pending: PendingQuery) -> CompletedQuery {
        let PendingQuery { generation, query } = pending;
        debug!(
            generation,
            source = self.fetcher.source_name(),
            "Running listing query for page {}",
            query.page
        );

        let outcome = match tokio::time::timeout(self.timeout, self.fetcher.fetch_page(&query)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        CompletedQuery {
            generation,
            query,
            outcome,
            fetched_at: Utc::now(),
        }
    }
}

pub struct ListingQueryEngine {
    executor: QueryExecutor,
    directory: RegionDirectory,
    settings: EngineSettings,
    filters: FilterState,
    search_query: String,
    page: u32,
    generation: u64,
    view: ViewState,
    in_flight: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<CompletedQuery>,
    completions_rx: mpsc::UnboundedReceiver<CompletedQuery>,
}

impl ListingQueryEngine {
    pub fn new(
        fetcher: Arc<dyn ListingFetcher>,
        directory: RegionDirectory,
        settings: EngineSettings,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            executor: QueryExecutor::new(fetcher, settings.request_timeout),
            directory,
            settings: EngineSettings {
                page_size: settings.page_size.max(1),
                ..settings
            },
            filters: FilterState::default(),
            search_query: String::new(),
            page: 1,
            generation: 0,
            view: ViewState::Idle,
            in_flight: None,
            completions_tx,
            completions_rx,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.settings.page_size
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn directory(&self) -> &RegionDirectory {
        &self.directory
    }

    pub fn executor(&self) -> QueryExecutor {
        self.executor.clone()
    }

    /// Merge one filter change and restart from page 1.
    ///
    /// Invalid input is rejected before anything changes.
    pub fn update_filter(&mut self, update: FilterUpdate) -> Result<PendingQuery, ValidationError> {
        update.validate(&self.filters, &self.directory, self.settings.strict_price_range)?;
        debug!("Updating filter {}", update.key());

        match update {
            FilterUpdate::SearchQuery(query) => {
                self.search_query = query.map(|q| q.trim().to_string()).unwrap_or_default();
            }
            other => self.filters.apply(other),
        }
        self.page = 1;
        Ok(self.issue())
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) -> PendingQuery {
        self.search_query = query.into().trim().to_string();
        self.page = 1;
        self.issue()
    }

    /// Back to "For Sale" with nothing else set. Safe to call repeatedly.
    pub fn clear_filters(&mut self) -> PendingQuery {
        info!("Clearing all listing filters");
        self.filters = FilterState::default();
        self.search_query.clear();
        self.page = 1;
        self.issue()
    }

    pub fn set_page(&mut self, page: u32) -> Result<PendingQuery, ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPage);
        }
        self.page = page;
        Ok(self.issue())
    }

    /// Only available while a successful page with a successor is shown
    pub fn next_page(&mut self) -> Option<PendingQuery> {
        match &self.view {
            ViewState::Success { total_pages, .. } if u64::from(self.page) < *total_pages => {
                self.page += 1;
                Some(self.issue())
            }
            _ => None,
        }
    }

    pub fn previous_page(&mut self) -> Option<PendingQuery> {
        if self.page <= 1 {
            return None;
        }
        self.page -= 1;
        Some(self.issue())
    }

    /// Re-issue the current query, e.g. on first mount
    pub fn refresh(&mut self) -> PendingQuery {
        self.issue()
    }

    pub fn cities_for(&self, region: Option<&str>) -> &[String] {
        self.directory.cities_for(region)
    }

    /// Cities offered for the currently selected region
    pub fn available_cities(&self) -> &[String] {
        self.directory.cities_for(self.filters.region.as_deref())
    }

    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count() + usize::from(!self.search_query.trim().is_empty())
    }

    pub fn current_query(&self) -> ListingQuery {
        ListingQuery::snapshot(
            &self.filters,
            &self.search_query,
            self.page,
            self.settings.page_size,
            &self.directory,
        )
    }

    fn issue(&mut self) -> PendingQuery {
        self.generation += 1;
        self.view = ViewState::Loading {
            generation: self.generation,
        };
        PendingQuery {
            generation: self.generation,
            query: self.current_query(),
        }
    }

    /// Apply a finished query. Returns `false` if it was superseded.
    pub fn complete(&mut self, done: CompletedQuery) -> bool {
        if done.generation != self.generation {
            debug!(
                stale = done.generation,
                latest = self.generation,
                "Discarding stale listing response"
            );
            return false;
        }

        self.view = match done.outcome {
            Ok(result) if result.total == 0 => {
                let hints = hints_for(&done.query.filters, &self.settings.thresholds);
                info!("No properties matched ({} hints)", hints.len());
                ViewState::Empty { hints }
            }
            Ok(result) => ViewState::Success {
                total_pages: done.query.total_pages(result.total),
                total: result.total,
                properties: result.properties,
                fetched_at: done.fetched_at,
            },
            Err(err) => {
                warn!("Listing query failed: {}", err);
                ViewState::Error {
                    message: err.user_message(),
                }
            }
        };
        true
    }

    /// Run `pending` on a background task, aborting whatever it supersedes.
    ///
    /// Must be called from within a tokio runtime. Results arrive through
    /// [`next_completion`](Self::next_completion).
    pub fn dispatch(&mut self, pending: PendingQuery) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let executor = self.executor.clone();
        let tx = self.completions_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let done = executor.execute(pending).await;
            // receiver lives as long as the engine
            let _ = tx.send(done);
        }));
    }

    /// Wait for the latest dispatched query and apply what it produced.
    ///
    /// Returns `true` if the view changed. With nothing in flight this
    /// returns `false` right away instead of waiting.
    pub async fn next_completion(&mut self) -> bool {
        if let Some(task) = self.in_flight.as_mut() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    warn!("Listing query task failed: {}", err);
                }
            }
            self.in_flight = None;
        }

        // superseded tasks may have sent before they were aborted
        let mut applied = false;
        while let Ok(done) = self.completions_rx.try_recv() {
            applied |= self.complete(done);
        }
        applied
    }

    /// Run `pending` inline and apply the result.
    pub async fn run(&mut self, pending: PendingQuery) -> &ViewState {
        let done = self.executor.execute(pending).await;
        self.complete(done);
        &self.view
    }
}

impl Drop for ListingQueryEngine {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoopFetcher;

    #[async_trait]
    impl ListingFetcher for NoopFetcher {
        async fn fetch_page(&self, _query: &ListingQuery) -> Result<QueryResult, FetchError> {
            Ok(QueryResult::default())
        }

        fn source_name(&self) -> &'static str {
            "noop"
        }
    }

    fn engine() -> ListingQueryEngine {
        ListingQueryEngine::new(
            Arc::new(NoopFetcher),
            RegionDirectory::ethiopia(),
            EngineSettings::default(),
        )
    }

    fn done(pending: PendingQuery, outcome: Result<QueryResult, FetchError>) -> CompletedQuery {
        CompletedQuery {
            generation: pending.generation,
            query: pending.query,
            outcome,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_starts_idle_with_defaults() {
        let engine = engine();
        assert_eq!(engine.view().kind(), ViewKind::Idle);
        assert_eq!(engine.page(), 1);
        assert_eq!(engine.active_filter_count(), 0);
    }

    #[test]
    fn test_rejected_update_changes_nothing() {
        let mut engine = engine();
        engine.set_page(4).unwrap();
        let generation = engine.generation();

        let err = engine
            .update_filter(FilterUpdate::Region(Some("Mars".into())))
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownRegion("Mars".into()));
        assert_eq!(engine.page(), 4);
        assert_eq!(engine.generation(), generation);
        assert_eq!(engine.filters().region, None);
    }

    #[tokio::test]
    async fn test_next_completion_without_dispatch_returns() {
        let mut engine = engine();
        engine.refresh();

        let waited = tokio::time::timeout(Duration::from_secs(1), engine.next_completion()).await;
        assert_eq!(waited, Ok(false));
        assert_eq!(engine.view().kind(), ViewKind::Loading);
    }

    #[tokio::test]
    async fn test_next_completion_after_drain_returns() {
        let mut engine = engine();
        let pending = engine.refresh();
        engine.dispatch(pending);

        assert!(engine.next_completion().await);
        assert_eq!(engine.view().kind(), ViewKind::Empty);

        let again = tokio::time::timeout(Duration::from_secs(1), engine.next_completion()).await;
        assert_eq!(again, Ok(false));
    }

    #[test]
    fn test_set_page_zero_rejected() {
        let mut engine = engine();
        assert_eq!(engine.set_page(0), Err(ValidationError::InvalidPage));
    }

    #[test]
    fn test_success_exposes_total_pages() {
        let mut engine = engine();
        let pending = engine.refresh();
        let result = QueryResult {
            properties: Vec::new(),
            total: 13,
        };
        assert!(engine.complete(done(pending, Ok(result))));

        match engine.view() {
            ViewState::Success {
                total, total_pages, ..
            } => {
                assert_eq!(*total, 13);
                assert_eq!(*total_pages, 3);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_paging_is_bounded_by_total_pages() {
        let mut engine = engine();
        assert!(engine.next_page().is_none(), "no page count known yet");

        let pending = engine.refresh();
        let result = QueryResult {
            properties: Vec::new(),
            total: 7,
        };
        engine.complete(done(pending, Ok(result.clone())));

        let pending = engine.next_page().expect("second page exists");
        assert_eq!(pending.query.page, 2);
        engine.complete(done(pending, Ok(result)));
        assert!(engine.next_page().is_none());

        let back = engine.previous_page().expect("can go back");
        assert_eq!(back.query.page, 1);
        assert!(engine.previous_page().is_none());
    }

    #[test]
    fn test_search_query_update_trims_and_counts() {
        let mut engine = engine();
        engine
            .update_filter(FilterUpdate::SearchQuery(Some("  bole  ".into())))
            .unwrap();
        assert_eq!(engine.search_query(), "bole");
        assert_eq!(engine.active_filter_count(), 1);

        engine.set_search_query("   ");
        assert_eq!(engine.active_filter_count(), 0);
    }

    #[test]
    fn test_available_cities_follow_region() {
        let mut engine = engine();
        assert!(engine.available_cities().is_empty());
        engine
            .update_filter(FilterUpdate::Region(Some("Sidama".into())))
            .unwrap();
        assert_eq!(engine.available_cities(), ["Hawassa".to_string(), "Yirgalem".to_string()]);
    }
}
