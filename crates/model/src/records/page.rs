use crate::{pagination::cursor::Cursor, records::row::Row};
use serde::{Deserialize, Serialize};

/// Response body of the list endpoint:
/// `{ "items": [...], "continuationToken": "..." | null }`.
///
/// `items` is required; a body without it is malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub items: Vec<Row>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

impl ListPage {
    pub fn new(items: Vec<Row>, continuation_token: Option<String>) -> Self {
        ListPage {
            items,
            continuation_token,
        }
    }

    pub fn next_cursor(&self) -> Cursor {
        Cursor::from_token(self.continuation_token.clone())
    }
}
