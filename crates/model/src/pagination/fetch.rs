use crate::{pagination::cursor::Cursor, records::row::Row};

/// One page as seen by the fetch loop.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub rows: Vec<Row>,
    pub next_cursor: Cursor,
    pub row_count: usize,
    pub took_ms: u128,
}

impl FetchResult {
    pub fn new(rows: Vec<Row>, next_cursor: Cursor, took_ms: u128) -> Self {
        FetchResult {
            row_count: rows.len(),
            rows,
            next_cursor,
            took_ms,
        }
    }
}
