use crate::{
    columns::derive_columns,
    filter::filter,
    paginate::{paginate, total_pages},
    sort::sort,
};
use model::{
    records::row::Row,
    view::{snapshot::ViewSnapshot, state::ViewState},
};
use tracing::debug;

/// Filter, then sort, then cut out the current page. Columns are derived
/// from every loaded row so they do not jump while the filter changes.
pub fn render_view(rows: &[Row], state: &ViewState) -> ViewSnapshot {
    let columns = derive_columns(rows);
    let filtered = sort(filter(rows, &state.filter), &state.sort);
    let total_pages = total_pages(filtered.len(), state.page_size);
    let page = state.page.max(1);
    debug!(
        filtered = filtered.len(),
        total = rows.len(),
        page,
        total_pages,
        "Rendered view"
    );

    ViewSnapshot {
        columns,
        rows: paginate(&filtered, page, state.page_size)
            .iter()
            .map(|row| (*row).clone())
            .collect(),
        page,
        total_pages,
        filtered_count: filtered.len(),
        total_count: rows.len(),
        sort: state.sort.clone(),
        filter: state.filter.clone(),
        more_available: false,
    }
}
