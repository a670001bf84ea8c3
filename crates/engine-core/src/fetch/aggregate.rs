use crate::{error::FetchError, fetch::reader::PageReader};
use model::{pagination::cursor::Cursor, records::row::Row};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Result of a full aggregation cycle. Failures are reported, not thrown:
/// the caller decides whether partial rows are worth showing.
#[derive(Debug)]
pub struct FetchOutcome {
    pub rows: Vec<Row>,
    pub pages: usize,
    /// Cursor the loop stopped at; `None` after a complete run.
    pub last_cursor: Cursor,
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    fn complete(rows: Vec<Row>, pages: usize) -> Self {
        FetchOutcome {
            rows,
            pages,
            last_cursor: Cursor::None,
            error: None,
        }
    }

    fn failed(mut rows: Vec<Row>, pages: usize, last_cursor: Cursor, error: FetchError) -> Self {
        if !error.keeps_partial_rows() {
            rows.clear();
        }
        FetchOutcome {
            rows,
            pages,
            last_cursor,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Failed, but some rows made it.
    pub fn is_partial(&self) -> bool {
        self.error.is_some() && !self.rows.is_empty()
    }
}

/// Follows the continuation token until the source reports no more data,
/// concatenating every page's items in fetch order.
pub async fn fetch_all(reader: &PageReader, cancel: &CancellationToken) -> FetchOutcome {
    let mut rows = Vec::new();
    let mut cursor = Cursor::None;
    let mut pages = 0usize;

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(pages, rows = rows.len(), "Cancellation requested. Stopping fetch.");
                return FetchOutcome::failed(rows, pages, cursor, FetchError::Cancelled);
            }
            result = reader.fetch(&cursor) => result,
        };

        let result = match result {
            Ok(result) => result,
            Err(err) => {
                warn!(pages, rows = rows.len(), "Fetch stopped early: {err}");
                return FetchOutcome::failed(rows, pages, cursor, err);
            }
        };

        if PageReader::is_stalled(&cursor, &result) {
            warn!(cursor = %cursor, "Source returned the same cursor twice. Stopping fetch.");
            let stalled = cursor.clone();
            return FetchOutcome::failed(rows, pages, cursor, FetchError::CursorStalled(stalled));
        }

        pages += 1;
        info!(
            page = pages,
            rows = result.row_count,
            has_more = result.next_cursor.has_more(),
            took_ms = result.took_ms as u64,
            "Fetched page."
        );

        rows.extend(result.rows);

        if result.next_cursor.is_none() {
            info!(pages, rows = rows.len(), "No more pages to fetch.");
            return FetchOutcome::complete(rows, pages);
        }
        cursor = result.next_cursor;
    }
}
