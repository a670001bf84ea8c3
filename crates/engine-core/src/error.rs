use connectors::{auth::error::AuthError, error::AdapterError};
use model::pagination::cursor::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetch failed at cursor {cursor}: {source}")]
    Source { cursor: Cursor, source: AdapterError },

    #[error("Retry attempts exhausted at cursor {cursor} after {attempts} tries: {source}")]
    RetriesExhausted {
        cursor: Cursor,
        attempts: usize,
        source: AdapterError,
    },

    /// The source answered with the token it was just given.
    #[error("Cursor did not advance: source returned {0} again")]
    CursorStalled(Cursor),

    #[error("Page {0} is not reachable: the page before it has not been fetched")]
    PageNotReachable(usize),

    #[error("Page {0} is past the end of the data")]
    EndOfData(usize),

    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            FetchError::Source { source, .. } | FetchError::RetriesExhausted { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }

    pub fn auth_error(&self) -> Option<&AuthError> {
        match self.adapter_error() {
            Some(AdapterError::Auth(err)) => Some(err),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.auth_error().is_some()
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.adapter_error(), Some(AdapterError::Malformed(_)))
    }

    /// Whether rows gathered before this error are still worth showing.
    /// A malformed body or a missing token voids the whole cycle.
    pub fn keeps_partial_rows(&self) -> bool {
        !(self.is_malformed() || self.is_auth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(err: AdapterError) -> FetchError {
        FetchError::Source {
            cursor: Cursor::None,
            source: err,
        }
    }

    #[test]
    fn test_partial_rows_policy() {
        let status = source(AdapterError::Status {
            status: 500,
            body: "boom".into(),
        });
        assert!(status.keeps_partial_rows());
        assert!(FetchError::CursorStalled(Cursor::Token("t".into())).keeps_partial_rows());
        assert!(!source(AdapterError::Malformed("eof".into())).keeps_partial_rows());
        assert!(!source(AdapterError::Auth(AuthError::InteractionRequired)).keeps_partial_rows());
    }

    #[test]
    fn test_status_body_is_reported() {
        let err = FetchError::RetriesExhausted {
            cursor: Cursor::Token("t2".into()),
            attempts: 2,
            source: AdapterError::Status {
                status: 503,
                body: "busy".into(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("busy"));
        assert!(message.contains("t2"));
    }
}
