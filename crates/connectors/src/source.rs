use crate::error::AdapterError;
use async_trait::async_trait;
use model::{pagination::cursor::Cursor, records::page::ListPage};

/// A remote table that serves rows page by page behind a continuation token.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Requests one page of at most `page_size` rows starting at `cursor`.
    async fn fetch_page(&self, page_size: usize, cursor: &Cursor)
    -> Result<ListPage, AdapterError>;

    /// Makes sure requests can be issued, e.g. that an access token is
    /// available. Sources without a sign-in requirement are always ready.
    async fn authorize(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Human-readable location for logs. Must not contain secrets.
    fn describe(&self) -> String;
}
