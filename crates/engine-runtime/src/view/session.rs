use crate::{
    error::ViewError,
    view::{
        controller::{Applied, LoadOutcome, RemoteProgress, TableView},
        status::ViewStatus,
    },
};
use engine_core::fetch::{PageReader, PagedFetcher, fetch_all};
use model::{
    records::row::Row,
    view::{snapshot::ViewSnapshot, state::SortState},
};
use std::num::NonZeroUsize;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// How rows are brought into the view.
pub enum Loader {
    /// Follow the cursor to the end, then page in memory.
    Full(PageReader),
    /// One remote page at a time on request; fetched pages accumulate.
    Incremental(PagedFetcher),
}

impl Loader {
    fn reader(&self) -> &PageReader {
        match self {
            Loader::Full(reader) => reader,
            Loader::Incremental(fetcher) => fetcher.reader(),
        }
    }
}

/// A [`TableView`] wired to its loader. Commands run one at a time; each
/// load goes through a ticket so late results can never overwrite newer ones.
pub struct TableSession {
    view: TableView,
    loader: Loader,
    cancel: CancellationToken,
}

impl TableSession {
    pub fn new(loader: Loader, view_page_size: NonZeroUsize, cancel: CancellationToken) -> Self {
        TableSession {
            view: TableView::new(view_page_size),
            loader,
            cancel,
        }
    }

    pub fn status(&self) -> &ViewStatus {
        self.view.status()
    }

    pub fn rows(&self) -> &[Row] {
        self.view.rows()
    }

    pub fn columns(&self) -> Vec<String> {
        self.view.columns()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot()
    }

    pub fn is_incremental(&self) -> bool {
        matches!(self.loader, Loader::Incremental(_))
    }

    /// Initial load: everything in full mode, the first page otherwise.
    pub async fn load(&mut self) -> Result<Applied, ViewError> {
        let ticket = self.view.begin_load()?;
        info!(source = %self.loader.reader().source().describe(), "Loading table");

        if let Err(err) = self.loader.reader().authorize().await {
            return Ok(self.view.complete_load(ticket, LoadOutcome::failed(err)));
        }

        let outcome = match &mut self.loader {
            Loader::Full(reader) => LoadOutcome::from(fetch_all(reader, &self.cancel).await),
            Loader::Incremental(fetcher) => Self::load_page(fetcher, 1).await,
        };
        Ok(self.view.complete_load(ticket, outcome))
    }

    /// Drops everything cached and loads again.
    pub async fn reload(&mut self) -> Result<Applied, ViewError> {
        if let Loader::Incremental(fetcher) = &mut self.loader {
            fetcher.reset();
        }
        self.load().await
    }

    /// Whether `more` can still bring in rows.
    pub fn has_more(&self) -> bool {
        match &self.loader {
            Loader::Full(_) => false,
            Loader::Incremental(fetcher) => !fetcher.is_exhausted(),
        }
    }

    pub fn next_page(&mut self) {
        self.view.next_page();
    }

    pub fn prev_page(&mut self) {
        self.view.prev_page();
    }

    pub fn go_to(&mut self, page: usize) {
        self.view.go_to(page);
    }

    /// Appends the next remote page to the loaded rows. No-op in full mode,
    /// and once the last remote page has been seen.
    pub async fn more(&mut self) -> Result<Applied, ViewError> {
        let Loader::Incremental(fetcher) = &mut self.loader else {
            return Ok(Applied::Unchanged);
        };
        if fetcher.is_exhausted() {
            info!(pages = fetcher.known_pages(), "Whole table already loaded");
            return Ok(Applied::Unchanged);
        }

        let ticket = self.view.begin_load()?;
        let next = fetcher.known_pages() + 1;
        let outcome = Self::load_page(fetcher, next).await;
        Ok(self.view.complete_load(ticket, outcome))
    }

    /// A new filter restarts at page 1.
    pub fn set_filter(&mut self, text: &str) {
        self.view.set_filter(text);
    }

    pub fn toggle_sort(&mut self, key: &str) {
        self.view.toggle_sort(key);
    }

    pub fn clear_sort(&mut self) {
        self.view.clear_sort();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.view.set_sort(sort);
    }

    /// Turns a failed status into an error for one-shot callers.
    pub fn ensure_ready(&self) -> Result<(), ViewError> {
        match self.view.status() {
            ViewStatus::Unauthenticated(e) => Err(ViewError::Unauthenticated(e.clone())),
            ViewStatus::Failed(e) => Err(ViewError::LoadFailed(e.clone())),
            _ => Ok(()),
        }
    }

    /// Fetches `page` and hands the view every row loaded so far. A failed
    /// page leaves the earlier ones in place, shown as partial data.
    async fn load_page(fetcher: &mut PagedFetcher, page: usize) -> LoadOutcome {
        let fetch = fetcher.fetch_page(page).await;
        LoadOutcome {
            rows: fetcher.loaded_rows(),
            error: fetch.error,
            remote: Some(RemoteProgress {
                pages_loaded: fetcher.known_pages(),
                has_more: !fetcher.is_exhausted(),
            }),
        }
    }
}
