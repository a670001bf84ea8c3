use serde::{Deserialize, Serialize};
use std::{fmt, num::NonZeroUsize, str::FromStr};

pub const DEFAULT_VIEW_PAGE_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(19);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// Active sort column and direction. No key means natural fetch order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        SortState {
            key: Some(key.into()),
            direction,
        }
    }

    /// Clicking the active column flips its direction; any other column
    /// becomes the new key, ascending.
    pub fn toggle(&self, key: &str) -> Self {
        match &self.key {
            Some(current) if current == key => SortState {
                key: Some(current.clone()),
                direction: self.direction.flipped(),
            },
            _ => SortState::by(key, SortDirection::Ascending),
        }
    }

    pub fn clear(&self) -> Self {
        SortState::default()
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }
}

/// Presentation state of a table view. Transitions return a new value; the
/// view controller holds the only mutable copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filter: String,
    pub sort: SortState,
    /// 1-based.
    pub page: usize,
    pub page_size: NonZeroUsize,
}

impl ViewState {
    pub fn new(page_size: NonZeroUsize) -> Self {
        ViewState {
            filter: String::new(),
            sort: SortState::default(),
            page: 1,
            page_size,
        }
    }

    /// A new filter always restarts at page 1.
    pub fn with_filter(&self, text: impl Into<String>) -> Self {
        ViewState {
            filter: text.into(),
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: SortState) -> Self {
        ViewState {
            sort,
            ..self.clone()
        }
    }

    pub fn toggle_sort(&self, key: &str) -> Self {
        self.with_sort(self.sort.toggle(key))
    }

    pub fn with_page_size(&self, page_size: NonZeroUsize) -> Self {
        ViewState {
            page_size,
            page: 1,
            ..self.clone()
        }
    }

    /// Moves to `page`, clamped into `1..=total_pages`.
    pub fn go_to(&self, page: usize, total_pages: usize) -> Self {
        ViewState {
            page: page.clamp(1, total_pages.max(1)),
            ..self.clone()
        }
    }

    pub fn next_page(&self, total_pages: usize) -> Self {
        self.go_to(self.page.saturating_add(1), total_pages)
    }

    pub fn prev_page(&self, total_pages: usize) -> Self {
        self.go_to(self.page.saturating_sub(1), total_pages)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(DEFAULT_VIEW_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_toggle_same_key_flips_direction() {
        let sort = SortState::default().toggle("Age");
        assert_eq!(sort, SortState::by("Age", SortDirection::Ascending));
        let sort = sort.toggle("Age");
        assert_eq!(sort.direction, SortDirection::Descending);
        let sort = sort.toggle("Age");
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_toggle_new_key_resets_to_ascending() {
        let sort = SortState::by("Age", SortDirection::Descending).toggle("Name");
        assert_eq!(sort, SortState::by("Name", SortDirection::Ascending));
    }

    #[test]
    fn test_filter_change_resets_page() {
        let state = ViewState::new(size(10)).go_to(4, 9);
        assert_eq!(state.page, 4);
        let filtered = state.with_filter("abc");
        assert_eq!(filtered.page, 1);
        assert_eq!(filtered.filter, "abc");
        assert_eq!(filtered.with_filter("").page, 1);
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let state = ViewState::new(size(10));
        assert_eq!(state.prev_page(3).page, 1);
        assert_eq!(state.go_to(7, 3).page, 3);
        assert_eq!(state.go_to(0, 3).page, 1);
        assert_eq!(state.go_to(2, 0).page, 1);
        assert_eq!(state.next_page(3).next_page(3).next_page(3).page, 3);
    }

    #[test]
    fn test_sort_change_keeps_page() {
        let state = ViewState::new(size(10)).go_to(2, 5).toggle_sort("Age");
        assert_eq!(state.page, 2);
        assert!(state.sort.is_active());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Descending));
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
