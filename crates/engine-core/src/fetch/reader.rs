use crate::{
    error::FetchError,
    retry::{RetryError, RetryPolicy, classify_adapter_error},
};
use connectors::source::PageSource;
use model::pagination::{cursor::Cursor, fetch::FetchResult};
use std::{num::NonZeroUsize, sync::Arc, time::Instant};

/// Reads single pages from a source with the retry policy applied.
#[derive(Clone)]
pub struct PageReader {
    source: Arc<dyn PageSource>,
    retry: RetryPolicy,
    page_size: NonZeroUsize,
}

impl PageReader {
    pub fn new(source: Arc<dyn PageSource>, retry: RetryPolicy, page_size: NonZeroUsize) -> Self {
        Self {
            source,
            retry,
            page_size,
        }
    }

    pub fn source(&self) -> &Arc<dyn PageSource> {
        &self.source
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub async fn authorize(&self) -> Result<(), FetchError> {
        self.source
            .authorize()
            .await
            .map_err(|source| FetchError::Source {
                cursor: Cursor::None,
                source,
            })
    }

    /// Fetches the page at `cursor`, retrying transient failures.
    pub async fn fetch(&self, cursor: &Cursor) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let source = self.source.clone();
        let page_size = self.page_size.get();

        let page = self
            .retry
            .run(
                || {
                    let source = source.clone();
                    let cursor = cursor.clone();
                    async move { source.fetch_page(page_size, &cursor).await }
                },
                classify_adapter_error,
            )
            .await
            .map_err(|err| match err {
                RetryError::Fatal(source) => FetchError::Source {
                    cursor: cursor.clone(),
                    source,
                },
                RetryError::AttemptsExceeded { attempts, last } => FetchError::RetriesExhausted {
                    cursor: cursor.clone(),
                    attempts,
                    source: last,
                },
            })?;

        let next_cursor = page.next_cursor();
        Ok(FetchResult::new(
            page.items,
            next_cursor,
            start.elapsed().as_millis(),
        ))
    }

    /// A response that hands back the token it was requested with would make
    /// the cursor loop spin forever.
    pub fn is_stalled(sent: &Cursor, result: &FetchResult) -> bool {
        sent.has_more() && &result.next_cursor == sent
    }
}
