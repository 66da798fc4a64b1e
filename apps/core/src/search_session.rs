use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, CatalogProvider};
use crate::model::SearchResult;
use crate::navigation::Navigator;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Opened,
    FocusExisting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Navigated(String),
    AlreadyClosed,
    NothingSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Idle,
    Pending,
    Ready,
    NoResults,
}

/// Identifies one outstanding catalog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    query: String,
}

impl QueryTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Transient state of the search surface.
///
/// `Closed -> Open` on invoke, `Open -> Open` on query change, `Open -> Closed`
/// on dismiss or selection. Closing discards the query and results.
#[derive(Debug, Clone)]
pub struct SearchSession {
    open: bool,
    query: String,
    results: Vec<SearchResult>,
    selected_index: usize,
    generation: u64,
    status: SearchStatus,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            open: false,
            query: String::new(),
            results: Vec::new(),
            selected_index: 0,
            generation: 0,
            status: SearchStatus::Idle,
        }
    }
}

impl SearchSession {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&SearchResult> {
        self.results.get(self.selected_index)
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Explicit open or the global chord. A second invoke keeps the session.
    pub fn open(&mut self) -> SessionAction {
        if self.open {
            return SessionAction::FocusExisting;
        }
        self.reset();
        self.open = true;
        log::debug!("event=search_session status=opened");
        SessionAction::Opened
    }

    pub fn dismiss(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.close();
        log::debug!("event=search_session status=dismissed");
        true
    }

    /// Re-runs the query synchronously against a local catalog.
    pub fn set_query(&mut self, query: &str, catalog: &dyn CatalogProvider) -> &[SearchResult] {
        if let Some(ticket) = self.begin_query(query) {
            let outcome = catalog.query(ticket.query());
            self.complete_query(&ticket, outcome);
        }
        &self.results
    }

    /// Starts a query whose results arrive later. Returns `None` when the
    /// session is closed or the query is blank (results are cleared at once).
    pub fn begin_query(&mut self, query: &str) -> Option<QueryTicket> {
        if !self.open {
            return None;
        }
        self.generation += 1;
        self.query = query.to_string();
        self.selected_index = 0;

        if query.trim().is_empty() {
            self.results.clear();
            self.status = SearchStatus::Idle;
            return None;
        }

        self.status = SearchStatus::Pending;
        Some(QueryTicket {
            generation: self.generation,
            query: query.to_string(),
        })
    }

    /// Applies results for `ticket`. Responses to superseded queries, or that
    /// arrive after the session closed, are dropped.
    pub fn complete_query(
        &mut self,
        ticket: &QueryTicket,
        outcome: Result<Vec<SearchResult>, CatalogError>,
    ) -> bool {
        if !self.open || ticket.generation != self.generation {
            log::debug!(
                "event=search_query status=stale generation={} current={}",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.selected_index = 0;
        match outcome {
            Ok(results) => {
                self.status = if results.is_empty() {
                    SearchStatus::NoResults
                } else {
                    SearchStatus::Ready
                };
                self.results = results;
            }
            Err(error) => {
                log::warn!("event=search_query status=catalog_error error={error}");
                self.results.clear();
                self.status = SearchStatus::NoResults;
            }
        }
        true
    }

    pub fn move_selection(&mut self, direction: i32) -> usize {
        self.selected_index = next_selection_index(self.selected_index, self.results.len(), direction);
        self.selected_index
    }

    /// Closes the session and navigates to the result. Only the first call
    /// after opening navigates.
    pub fn select_result(
        &mut self,
        result: &SearchResult,
        navigator: &mut dyn Navigator,
    ) -> SelectOutcome {
        if !self.open {
            return SelectOutcome::AlreadyClosed;
        }
        self.close();
        navigator.navigate(&result.target_url);
        SelectOutcome::Navigated(result.target_url.clone())
    }

    pub fn select_current(&mut self, navigator: &mut dyn Navigator) -> SelectOutcome {
        if !self.open {
            return SelectOutcome::AlreadyClosed;
        }
        let Some(result) = self.selected().cloned() else {
            return SelectOutcome::NothingSelected;
        };
        self.select_result(&result, navigator)
    }

    fn close(&mut self) {
        self.reset();
        self.open = false;
    }

    fn reset(&mut self) {
        self.query.clear();
        self.results.clear();
        self.selected_index = 0;
        self.generation += 1;
        self.status = SearchStatus::Idle;
    }
}

pub fn next_selection_index(current: usize, len: usize, direction: i32) -> usize {
    if len == 0 {
        return 0;
    }

    let max = len - 1;
    if direction < 0 {
        current.saturating_sub(1).min(max)
    } else if direction > 0 {
        (current + 1).min(max)
    } else {
        current.min(max)
    }
}

/// Holds back keystrokes until typing pauses, keeping only the newest query.
#[derive(Debug, Clone)]
pub struct QueryDebouncer {
    window: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl QueryDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn push(&mut self, query: &str, now: Instant) {
        self.pending = Some((query.to_string(), now));
    }

    /// Releases the pending query once the window has elapsed since the last push.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = self
            .pending
            .as_ref()
            .map(|(_, at)| now.saturating_duration_since(*at) >= self.window)
            .unwrap_or(false);
        if ready {
            self.pending.take().map(|(query, _)| query)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{next_selection_index, QueryDebouncer, SearchSession, SessionAction};

    #[test]
    fn reopening_starts_from_empty_query() {
        let mut session = SearchSession::default();
        assert_eq!(session.open(), SessionAction::Opened);
        let _ = session.begin_query("rust");
        assert_eq!(session.query(), "rust");

        assert!(session.dismiss());
        assert_eq!(session.open(), SessionAction::Opened);
        assert_eq!(session.query(), "");
        assert!(session.results().is_empty());
    }

    #[test]
    fn invoke_while_open_focuses_existing() {
        let mut session = SearchSession::default();
        session.open();
        assert_eq!(session.open(), SessionAction::FocusExisting);
        assert!(session.is_open());
    }

    #[test]
    fn dismiss_is_noop_when_closed() {
        let mut session = SearchSession::default();
        assert!(!session.dismiss());
    }

    #[test]
    fn selection_index_bounds_are_stable() {
        assert_eq!(next_selection_index(0, 0, 1), 0);
        assert_eq!(next_selection_index(0, 3, -1), 0);
        assert_eq!(next_selection_index(1, 3, -1), 0);
        assert_eq!(next_selection_index(1, 3, 1), 2);
        assert_eq!(next_selection_index(2, 3, 1), 2);
        assert_eq!(next_selection_index(5, 3, 0), 2);
    }

    #[test]
    fn debouncer_releases_only_latest_query_after_window() {
        let start = Instant::now();
        let mut debouncer = QueryDebouncer::new(Duration::from_millis(200));
        debouncer.push("b", start);
        debouncer.push("bi", start + Duration::from_millis(100));

        assert_eq!(debouncer.poll(start + Duration::from_millis(250)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(300)),
            Some("bi".to_string())
        );
        assert!(!debouncer.is_pending());
    }
}
