use serde::Serialize;
use std::fmt;

/// Lifecycle of the table view as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Some rows loaded before the cycle failed.
    Partial(String),
    /// Nothing new could be shown; earlier rows, if any, are kept.
    Failed(String),
    /// No access token; no request was sent.
    Unauthenticated(String),
}

impl ViewStatus {
    pub fn error(&self) -> Option<&str> {
        match self {
            ViewStatus::Partial(e) | ViewStatus::Failed(e) | ViewStatus::Unauthenticated(e) => {
                Some(e)
            }
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewStatus::Loading)
    }
}

impl fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewStatus::Idle => f.write_str("idle"),
            ViewStatus::Loading => f.write_str("loading"),
            ViewStatus::Ready => f.write_str("ready"),
            ViewStatus::Partial(e) => write!(f, "partial data: {e}"),
            ViewStatus::Failed(e) => write!(f, "failed: {e}"),
            ViewStatus::Unauthenticated(e) => write!(f, "sign-in required: {e}"),
        }
    }
}
