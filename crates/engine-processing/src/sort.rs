use model::{
    core::value::Value,
    records::row::Row,
    view::state::{SortDirection, SortState},
};
use std::cmp::Ordering;

/// Orders two cell values: numerically when both read as numbers, otherwise
/// as collated text. Nulls are not handled here; see [`compare_rows`].
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    let a = a.as_text().unwrap_or_default();
    let b = b.as_text().unwrap_or_default();
    collate(&a, &b)
}

/// Case-folded comparison first, then lowercase before uppercase at the
/// first differing position, then raw code points.
///
/// Not locale-aware: accented letters and non-Latin scripts order by code
/// point after case folding, not by any language's collation rules.
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .map(|(x, y)| x.is_uppercase().cmp(&y.is_uppercase()))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.cmp(b))
}

/// Compares two rows on `key`. Null and absent values go last whatever the
/// direction.
pub fn compare_rows(a: &Row, b: &Row, key: &str, direction: SortDirection) -> Ordering {
    let (a, b) = (a.get_value(key), b.get_value(key));
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Ascending => compare_values(a, b),
            SortDirection::Descending => compare_values(a, b).reverse(),
        },
    }
}

/// Stable sort of `rows` by the sort state. No key keeps fetch order.
pub fn sort<'a>(mut rows: Vec<&'a Row>, state: &SortState) -> Vec<&'a Row> {
    let Some(key) = state.key.as_deref() else {
        return rows;
    };

    merge_sort(&mut rows, &|a: &&Row, b: &&Row| {
        compare_rows(a, b, key, state.direction)
    });
    rows
}

/// Stable top-down merge sort. Mixed numeric and text columns do not form
/// a strict total order, which `slice::sort_by` is allowed to reject.
fn merge_sort<T: Copy, F>(items: &mut [T], cmp: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return;
    }

    let mid = items.len() / 2;
    merge_sort(&mut items[..mid], cmp);
    merge_sort(&mut items[mid..], cmp);

    let mut merged = Vec::with_capacity(items.len());
    let (mut i, mut j) = (0, mid);
    while i < mid && j < items.len() {
        if cmp(&items[j], &items[i]) == Ordering::Less {
            merged.push(items[j]);
            j += 1;
        } else {
            merged.push(items[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&items[i..mid]);
    merged.extend_from_slice(&items[j..]);
    items.copy_from_slice(&merged);
}
