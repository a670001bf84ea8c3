use model::records::row::Row;
use std::collections::HashSet;

/// System fields of a table-store entity. Never shown as columns.
pub const RESERVED_KEYS: [&str; 4] = ["etag", "partitionkey", "rowkey", "timestamp"];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(key))
}

/// Union of the keys of `rows`, in first-seen order, reserved keys left out.
pub fn derive_columns(rows: &[Row]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for key in rows.iter().flat_map(Row::keys) {
        if is_reserved(key) || seen.contains(key) {
            continue;
        }
        seen.insert(key);
        columns.push(key.to_string());
    }

    columns
}
