use std::num::NonZeroUsize;

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Rows of the 1-based `page`. Pages below 1 read as page 1; pages past the
/// end are empty.
pub fn paginate<T>(rows: &[T], page: usize, page_size: NonZeroUsize) -> &[T] {
    let size = page_size.get();
    let start = (page.max(1) - 1).saturating_mul(size);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(rows.len());
    &rows[start..end]
}
