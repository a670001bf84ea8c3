use async_trait::async_trait;
use connectors::{error::AdapterError, source::PageSource};
use model::{
    core::value::Value,
    pagination::cursor::Cursor,
    records::{page::ListPage, row::Row},
};
use std::{collections::HashMap, sync::Mutex};

#[derive(Clone)]
pub enum Reply {
    Page(ListPage),
    Status(u16, &'static str),
    Transport,
    Malformed,
}

/// Source answering from a fixed script keyed by the requested token.
#[derive(Default)]
pub struct ScriptedSource {
    replies: HashMap<Option<String>, Vec<Reply>>,
    calls: Mutex<Vec<Cursor>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for `token`; the last queued reply repeats.
    pub fn on(mut self, token: Option<&str>, reply: Reply) -> Self {
        self.replies
            .entry(token.map(String::from))
            .or_default()
            .push(reply);
        self
    }

    pub fn page(self, token: Option<&str>, rows: Vec<Row>, next: Option<&str>) -> Self {
        self.on(token, Reply::Page(ListPage::new(rows, next.map(String::from))))
    }

    pub fn calls(&self) -> Vec<Cursor> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(
        &self,
        _page_size: usize,
        cursor: &Cursor,
    ) -> Result<ListPage, AdapterError> {
        let seen = {
            let mut calls = self.calls.lock().unwrap();
            let seen = calls.iter().filter(|c| *c == cursor).count();
            calls.push(cursor.clone());
            seen
        };

        let key = cursor.token().map(String::from);
        let replies = self
            .replies
            .get(&key)
            .unwrap_or_else(|| panic!("no scripted reply for {cursor}"));
        let reply = replies[seen.min(replies.len() - 1)].clone();

        match reply {
            Reply::Page(page) => Ok(page),
            Reply::Status(status, body) => Err(AdapterError::Status {
                status,
                body: body.to_string(),
            }),
            Reply::Transport => Err(AdapterError::Transport("connection reset".into())),
            Reply::Malformed => Err(AdapterError::Malformed("missing field `items`".into())),
        }
    }

    fn describe(&self) -> String {
        "scripted".into()
    }
}

pub fn row(id: i64, name: &str) -> Row {
    Row::from_pairs([
        ("PartitionKey", Value::from("p")),
        ("RowKey", Value::from(id.to_string())),
        ("Id", Value::from(id)),
        ("Name", Value::from(name)),
    ])
}
