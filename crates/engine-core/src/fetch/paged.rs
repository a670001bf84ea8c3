use crate::{error::FetchError, fetch::reader::PageReader};
use model::{
    pagination::{cursor::Cursor, fetch::FetchResult},
    records::row::Row,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct CachedPage {
    rows: Vec<Row>,
    next_cursor: Cursor,
}

/// One remote page as delivered to the view.
#[derive(Debug)]
pub struct PageFetch {
    pub page: usize,
    pub rows: Vec<Row>,
    pub next_cursor: Cursor,
    pub from_cache: bool,
    pub error: Option<FetchError>,
}

impl PageFetch {
    fn failed(page: usize, error: FetchError) -> Self {
        PageFetch {
            page,
            rows: Vec::new(),
            next_cursor: Cursor::None,
            from_cache: false,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// What it takes to produce a page.
#[derive(Debug)]
pub enum PagePlan {
    /// Already visited; no request needed.
    Cached(PageFetch),
    /// Must be requested with this cursor.
    Fetch { page: usize, cursor: Cursor },
    /// Cannot be produced from what is known.
    Unreachable(FetchError),
}

/// Page-at-a-time access to the remote table.
///
/// Page 1 starts at `Cursor::None`; the token that leads to page `n + 1` is
/// learned when page `n` is fetched. Visited pages are cached, so moving back
/// never re-requests and never needs to re-derive a token.
pub struct PagedFetcher {
    reader: PageReader,
    /// `cursors[i]` fetches page `i + 1`.
    cursors: Vec<Cursor>,
    pages: HashMap<usize, CachedPage>,
}

impl PagedFetcher {
    pub fn new(reader: PageReader) -> Self {
        PagedFetcher {
            reader,
            cursors: vec![Cursor::None],
            pages: HashMap::new(),
        }
    }

    pub fn reader(&self) -> &PageReader {
        &self.reader
    }

    pub fn plan(&self, page: usize) -> PagePlan {
        if page == 0 {
            return PagePlan::Unreachable(FetchError::PageNotReachable(0));
        }

        if let Some(cached) = self.cached(page) {
            return PagePlan::Cached(cached);
        }

        match self.cursors.get(page - 1) {
            Some(cursor) => PagePlan::Fetch {
                page,
                cursor: cursor.clone(),
            },
            None => {
                let previous_was_last = self
                    .pages
                    .get(&(page - 1))
                    .is_some_and(|p| p.next_cursor.is_none());
                if previous_was_last {
                    PagePlan::Unreachable(FetchError::EndOfData(page))
                } else {
                    PagePlan::Unreachable(FetchError::PageNotReachable(page))
                }
            }
        }
    }

    /// Stores the result of fetching `page` with `cursor` and turns it into
    /// the page delivered to the view.
    pub fn record(
        &mut self,
        page: usize,
        cursor: &Cursor,
        result: Result<FetchResult, FetchError>,
    ) -> PageFetch {
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                warn!(page, "Page fetch failed: {err}");
                return PageFetch::failed(page, err);
            }
        };

        if PageReader::is_stalled(cursor, &result) {
            warn!(page, cursor = %cursor, "Source returned the same cursor twice.");
            return PageFetch::failed(page, FetchError::CursorStalled(cursor.clone()));
        }

        info!(
            page,
            rows = result.row_count,
            has_more = result.next_cursor.has_more(),
            took_ms = result.took_ms as u64,
            "Fetched page."
        );

        if result.next_cursor.has_more() && self.cursors.len() == page {
            self.cursors.push(result.next_cursor.clone());
        }

        let cached = CachedPage {
            rows: result.rows,
            next_cursor: result.next_cursor,
        };
        let fetch = PageFetch {
            page,
            rows: cached.rows.clone(),
            next_cursor: cached.next_cursor.clone(),
            from_cache: false,
            error: None,
        };
        self.pages.insert(page, cached);
        fetch
    }

    /// Produces `page`, from cache when it was visited before.
    pub async fn fetch_page(&mut self, page: usize) -> PageFetch {
        match self.plan(page) {
            PagePlan::Cached(fetch) => {
                debug!(page, "Serving page from cache");
                fetch
            }
            PagePlan::Unreachable(err) => PageFetch::failed(page, err),
            PagePlan::Fetch { page, cursor } => {
                let result = self.reader.fetch(&cursor).await;
                self.record(page, &cursor, result)
            }
        }
    }

    pub fn cached(&self, page: usize) -> Option<PageFetch> {
        self.pages.get(&page).map(|cached| PageFetch {
            page,
            rows: cached.rows.clone(),
            next_cursor: cached.next_cursor.clone(),
            from_cache: true,
            error: None,
        })
    }

    /// Rows of every page fetched so far, in page order.
    pub fn loaded_rows(&self) -> Vec<Row> {
        (1..=self.pages.len())
            .filter_map(|page| self.pages.get(&page))
            .flat_map(|cached| cached.rows.iter().cloned())
            .collect()
    }

    pub fn known_pages(&self) -> usize {
        self.pages.len()
    }

    /// True once the last page of the table has been seen.
    pub fn is_exhausted(&self) -> bool {
        self.pages.values().any(|p| p.next_cursor.is_none())
    }

    pub fn reset(&mut self) {
        self.cursors.truncate(1);
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fetch::testing::{Reply, ScriptedSource, row},
        retry::RetryPolicy,
    };
    use std::{num::NonZeroUsize, sync::Arc};

    fn fetcher(source: Arc<ScriptedSource>) -> PagedFetcher {
        PagedFetcher::new(PageReader::new(
            source,
            RetryPolicy::no_retry(),
            NonZeroUsize::new(2).unwrap(),
        ))
    }

    fn three_pages() -> Arc<ScriptedSource> {
        Arc::new(
            ScriptedSource::new()
                .page(None, vec![row(1, "a"), row(2, "b")], Some("t1"))
                .page(Some("t1"), vec![row(3, "c"), row(4, "d")], Some("t2"))
                .page(Some("t2"), vec![row(5, "e")], None),
        )
    }

    #[tokio::test]
    async fn test_walks_forward_with_learned_cursors() {
        let source = three_pages();
        let mut fetcher = fetcher(source.clone());

        let first = fetcher.fetch_page(1).await;
        assert!(first.is_ok());
        assert_eq!(first.rows.len(), 2);
        assert!(first.next_cursor.has_more());
        assert!(!fetcher.is_exhausted());

        let third = fetcher.fetch_page(3).await;
        assert!(matches!(third.error, Some(FetchError::PageNotReachable(3))));

        let second = fetcher.fetch_page(2).await;
        assert_eq!(second.next_cursor, Cursor::Token("t2".into()));
        let third = fetcher.fetch_page(3).await;
        assert_eq!(third.rows.len(), 1);
        assert!(third.next_cursor.is_none());
        assert!(fetcher.is_exhausted());
        assert_eq!(fetcher.loaded_rows().len(), 5);

        assert_eq!(
            source.calls(),
            vec![
                Cursor::None,
                Cursor::Token("t1".into()),
                Cursor::Token("t2".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_going_back_uses_cache() {
        let source = three_pages();
        let mut fetcher = fetcher(source.clone());

        fetcher.fetch_page(1).await;
        fetcher.fetch_page(2).await;
        let back = fetcher.fetch_page(1).await;

        assert!(back.from_cache);
        assert_eq!(back.rows.len(), 2);
        assert_eq!(fetcher.loaded_rows().len(), 4);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_past_the_end() {
        let source = three_pages();
        let mut fetcher = fetcher(source);
        for page in 1..=3 {
            assert!(fetcher.fetch_page(page).await.is_ok());
        }

        let beyond = fetcher.fetch_page(4).await;
        assert!(matches!(beyond.error, Some(FetchError::EndOfData(4))));
        assert!(matches!(
            fetcher.fetch_page(0).await.error,
            Some(FetchError::PageNotReachable(0))
        ));
    }

    #[tokio::test]
    async fn test_failed_page_is_not_cached() {
        let source = Arc::new(
            ScriptedSource::new()
                .on(None, Reply::Status(503, "busy"))
                .page(None, vec![row(1, "a")], None),
        );
        let mut fetcher = fetcher(source.clone());

        let failed = fetcher.fetch_page(1).await;
        assert!(!failed.is_ok());
        assert_eq!(fetcher.known_pages(), 0);

        let retried = fetcher.fetch_page(1).await;
        assert!(retried.is_ok());
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_stalled_cursor() {
        let source = Arc::new(
            ScriptedSource::new()
                .page(None, vec![row(1, "a")], Some("t1"))
                .page(Some("t1"), vec![row(2, "b")], Some("t1")),
        );
        let mut fetcher = fetcher(source);

        fetcher.fetch_page(1).await;
        let stalled = fetcher.fetch_page(2).await;
        assert!(matches!(stalled.error, Some(FetchError::CursorStalled(_))));
        assert_eq!(fetcher.known_pages(), 1);
    }

    #[tokio::test]
    async fn test_reset_drops_cache() {
        let source = three_pages();
        let mut fetcher = fetcher(source.clone());
        fetcher.fetch_page(1).await;
        fetcher.reset();

        assert_eq!(fetcher.known_pages(), 0);
        assert!(!fetcher.fetch_page(1).await.from_cache);
        assert_eq!(source.calls().len(), 2);
    }
}
