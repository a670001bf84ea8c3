use crate::{records::row::Row, view::state::SortState};
use serde::Serialize;

/// Everything the renderer needs for one frame: the derived columns and the
/// rows of the current page, plus the counters for the pager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub sort: SortState,
    pub filter: String,
    /// The remote table has pages that were not loaded yet.
    pub more_available: bool,
}

impl ViewSnapshot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
