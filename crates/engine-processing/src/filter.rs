use model::records::row::Row;

/// Row predicate applied before sorting.
pub trait Filter: Send + Sync {
    fn should_keep(&self, row: &Row) -> bool;
}

/// Case-insensitive substring search over every value of a row, hidden
/// system fields included.
#[derive(Debug, Clone)]
pub struct TextFilter {
    needle: String,
}

impl TextFilter {
    pub fn new(text: &str) -> Self {
        TextFilter {
            needle: text.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }
}

impl Filter for TextFilter {
    fn should_keep(&self, row: &Row) -> bool {
        if self.is_empty() {
            return true;
        }

        row.values()
            .filter_map(|value| value.as_text())
            .any(|text| text.to_lowercase().contains(&self.needle))
    }
}

/// Rows containing `text`, in fetch order. Empty text keeps all.
pub fn filter<'a>(rows: &'a [Row], text: &str) -> Vec<&'a Row> {
    let filter = TextFilter::new(text);
    rows.iter().filter(|row| filter.should_keep(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    fn rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("Name", Value::from("Alice")), ("Age", Value::from(30))]),
            Row::from_pairs([("Name", Value::from("Bob")), ("Age", Value::Null)]),
            Row::from_pairs([("Name", Value::from("CAROL")), ("Active", Value::from(true))]),
        ]
    }

    #[test]
    fn test_empty_text_is_identity() {
        let rows = rows();
        let kept = filter(&rows, "");
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().zip(rows.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let rows = rows();
        let kept = filter(&rows, "caR");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].get_value("Name"), &Value::from("CAROL"));
    }

    #[test]
    fn test_numbers_render_without_fraction() {
        let rows = rows();
        assert_eq!(filter(&rows, "30").len(), 1);
        assert!(filter(&rows, "30.0").is_empty());
        assert_eq!(filter(&rows, "TRUE").len(), 1);
    }

    #[test]
    fn test_null_never_matches() {
        let rows = rows();
        assert!(filter(&rows, "null").is_empty());
    }

    #[test]
    fn test_reserved_fields_are_searched() {
        let rows = vec![Row::from_pairs([("RowKey", "row-42"), ("Name", "x")])];
        assert_eq!(filter(&rows, "row-42").len(), 1);
    }

    #[test]
    fn test_needle_is_not_trimmed() {
        let rows = vec![Row::from_pairs([("Name", "Ann Lee")])];
        assert_eq!(filter(&rows, "n l").len(), 1);
        assert!(filter(&rows, " ann").is_empty());
    }
}
