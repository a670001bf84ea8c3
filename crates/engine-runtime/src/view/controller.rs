use crate::{error::ViewError, view::status::ViewStatus};
use engine_core::{error::FetchError, fetch::FetchOutcome};
use engine_processing::{columns::derive_columns, pipeline::render_view};
use model::{
    records::row::Row,
    view::{
        snapshot::ViewSnapshot,
        state::{SortState, ViewState},
    },
};
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Proof that a load was started. Only the ticket of the latest load can
/// complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// How much of the remote table page-at-a-time loading has brought in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteProgress {
    pub pages_loaded: usize,
    pub has_more: bool,
}

/// Result of a load, whatever the strategy.
#[derive(Debug)]
pub struct LoadOutcome {
    pub rows: Vec<Row>,
    pub error: Option<FetchError>,
    pub remote: Option<RemoteProgress>,
}

impl LoadOutcome {
    pub fn failed(error: FetchError) -> Self {
        LoadOutcome {
            rows: Vec::new(),
            error: Some(error),
            remote: None,
        }
    }
}

impl From<FetchOutcome> for LoadOutcome {
    fn from(outcome: FetchOutcome) -> Self {
        LoadOutcome {
            rows: outcome.rows,
            error: outcome.error,
            remote: None,
        }
    }
}

/// What `complete_load` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// New rows are shown.
    Replaced,
    /// Rows gathered before a failure are shown.
    Partial,
    /// The load failed without usable rows; the previous rows stay.
    KeptPrevious,
    /// The response was unreadable; nothing from this cycle is used.
    Discarded,
    /// No token could be acquired.
    Unauthenticated,
    /// A newer load superseded this one.
    Stale,
    /// Nothing to do, e.g. moving past the last page.
    Unchanged,
}

/// The table view controller. Owns the loaded rows and the only mutable
/// copy of the view state; every transition replaces the state wholesale.
#[derive(Debug)]
pub struct TableView {
    rows: Vec<Row>,
    state: ViewState,
    status: ViewStatus,
    generation: u64,
    loading: bool,
    remote: Option<RemoteProgress>,
}

impl TableView {
    pub fn new(page_size: NonZeroUsize) -> Self {
        TableView {
            rows: Vec::new(),
            state: ViewState::new(page_size),
            status: ViewStatus::Idle,
            generation: 0,
            loading: false,
            remote: None,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn columns(&self) -> Vec<String> {
        derive_columns(&self.rows)
    }

    /// Starts a load. Refused while another load is in flight.
    pub fn begin_load(&mut self) -> Result<LoadTicket, ViewError> {
        if self.loading {
            return Err(ViewError::Busy);
        }
        Ok(self.restart_load())
    }

    /// Starts a load, superseding any load in flight.
    pub fn restart_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        self.status = ViewStatus::Loading;
        debug!(generation = self.generation, "Load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn complete_load(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> Applied {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Ignoring stale load result"
            );
            return Applied::Stale;
        }
        self.loading = false;

        let Some(err) = outcome.error else {
            self.replace_rows(outcome.rows, outcome.remote);
            self.status = ViewStatus::Ready;
            info!(rows = self.rows.len(), "View loaded");
            return Applied::Replaced;
        };

        let message = err.to_string();
        if err.is_auth() {
            warn!("Load refused, no access token: {message}");
            self.status = ViewStatus::Unauthenticated(message);
            return Applied::Unauthenticated;
        }
        if err.is_malformed() {
            warn!("Discarding load cycle: {message}");
            self.status = ViewStatus::Failed(message);
            return Applied::Discarded;
        }
        if outcome.rows.is_empty() {
            warn!("Load failed, keeping previous rows: {message}");
            self.status = ViewStatus::Failed(message);
            return Applied::KeptPrevious;
        }

        warn!(rows = outcome.rows.len(), "Showing partial data: {message}");
        self.replace_rows(outcome.rows, outcome.remote);
        self.status = ViewStatus::Partial(message);
        Applied::Partial
    }

    /// Swaps in the loaded rows, keeping the page when it still exists.
    fn replace_rows(&mut self, rows: Vec<Row>, remote: Option<RemoteProgress>) {
        if let Some(progress) = remote {
            debug!(
                pages = progress.pages_loaded,
                has_more = progress.has_more,
                "Remote table partly loaded"
            );
        }
        self.rows = rows;
        self.remote = remote;
        let total = self.snapshot().total_pages;
        self.state = self.state.go_to(self.state.page, total);
    }

    pub fn set_filter(&mut self, text: &str) {
        self.state = self.state.with_filter(text);
    }

    pub fn toggle_sort(&mut self, key: &str) {
        self.state = self.state.toggle_sort(key);
    }

    pub fn clear_sort(&mut self) {
        self.state = self.state.with_sort(SortState::default());
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.state = self.state.with_sort(sort);
    }

    /// In-memory navigation, clamped to the pages of the filtered rows.
    pub fn go_to(&mut self, page: usize) {
        let total = self.snapshot().total_pages;
        self.state = self.state.go_to(page, total);
    }

    pub fn next_page(&mut self) {
        let total = self.snapshot().total_pages;
        self.state = self.state.next_page(total);
    }

    pub fn prev_page(&mut self) {
        let total = self.snapshot().total_pages;
        self.state = self.state.prev_page(total);
    }

    /// Frame for the renderer: every loaded row goes through the same
    /// filter, sort and paging, whatever brought it in.
    pub fn snapshot(&self) -> ViewSnapshot {
        let mut snapshot = render_view(&self.rows, &self.state);
        snapshot.more_available = self.remote.is_some_and(|remote| remote.has_more);
        snapshot
    }
}
