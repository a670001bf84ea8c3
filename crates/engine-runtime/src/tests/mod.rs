//! Shared fixtures for the view tests.

use async_trait::async_trait;
use connectors::{auth::error::AuthError, error::AdapterError, source::PageSource};
use engine_core::error::FetchError;
use model::{
    core::value::Value,
    pagination::cursor::Cursor,
    records::{page::ListPage, row::Row},
};
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

pub fn row(id: i64, name: &str) -> Row {
    Row::from_pairs([
        ("PartitionKey", Value::from("pk")),
        ("RowKey", Value::from(format!("{id:04}"))),
        ("Id", Value::from(id)),
        ("Name", Value::from(name)),
    ])
}

pub fn status_failure(status: u16) -> FetchError {
    FetchError::Source {
        cursor: Cursor::None,
        source: AdapterError::Status {
            status,
            body: "unavailable".into(),
        },
    }
}

pub fn malformed() -> FetchError {
    FetchError::Source {
        cursor: Cursor::None,
        source: AdapterError::Malformed("expected value at line 1".into()),
    }
}

pub fn auth_failure() -> FetchError {
    FetchError::Source {
        cursor: Cursor::None,
        source: AdapterError::Auth(AuthError::InteractionRequired),
    }
}

/// In-memory paged table: `pages[i]` is served for the i-th token, the
/// token of page `i + 1` being `p{i+1}`.
pub struct MockSource {
    pages: Vec<Vec<Row>>,
    failures: HashMap<usize, u16>,
    signed_in: AtomicBool,
    calls: Mutex<Vec<Cursor>>,
}

impl MockSource {
    pub fn new(pages: Vec<Vec<Row>>) -> Self {
        Self {
            pages,
            failures: HashMap::new(),
            signed_in: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers the 0-based page `index` with `status`.
    pub fn failing_at(mut self, index: usize, status: u16) -> Self {
        self.failures.insert(index, status);
        self
    }

    pub fn signed_out(self) -> Self {
        self.signed_in.store(false, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PageSource for MockSource {
    async fn fetch_page(
        &self,
        _page_size: usize,
        cursor: &Cursor,
    ) -> Result<ListPage, AdapterError> {
        self.authorize().await?;
        self.calls.lock().unwrap().push(cursor.clone());

        let index = match cursor.token() {
            None => 0,
            Some(token) => token.trim_start_matches('p').parse::<usize>().unwrap(),
        };
        if let Some(status) = self.failures.get(&index) {
            return Err(AdapterError::Status {
                status: *status,
                body: "storage unavailable".into(),
            });
        }

        let next = (index + 1 < self.pages.len()).then(|| format!("p{}", index + 1));
        Ok(ListPage::new(self.pages[index].clone(), next))
    }

    async fn authorize(&self) -> Result<(), AdapterError> {
        if self.signed_in.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthError::InteractionRequired.into())
        }
    }

    fn describe(&self) -> String {
        "mock".into()
    }
}
