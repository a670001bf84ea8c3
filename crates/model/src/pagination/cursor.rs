use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the remote table's page sequence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Start of data when sent, end of data when returned.
    #[default]
    None,

    /// Opaque continuation token issued by the data source.
    Token(String),
}

impl Cursor {
    /// Reads the wire form of a continuation token. Empty tokens mean
    /// "no more data", same as `null`.
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(t) if !t.is_empty() => Cursor::Token(t),
            _ => Cursor::None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Cursor::None => None,
            Cursor::Token(t) => Some(t.as_str()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cursor::None)
    }

    /// Whether a response carrying this cursor announces more data.
    pub fn has_more(&self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::None => f.write_str("<none>"),
            // tokens can be long base64 blobs; logs only need to tell them apart
            Cursor::Token(t) if t.chars().count() > 16 => {
                let head: String = t.chars().take(16).collect();
                write!(f, "{head}…")
            }
            Cursor::Token(t) => f.write_str(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_end_of_data() {
        assert_eq!(Cursor::from_token(None), Cursor::None);
        assert_eq!(Cursor::from_token(Some(String::new())), Cursor::None);
        assert_eq!(
            Cursor::from_token(Some("t1".into())),
            Cursor::Token("t1".into())
        );
    }

    #[test]
    fn test_display_shortens_long_tokens() {
        let cursor = Cursor::Token("a".repeat(40));
        assert_eq!(cursor.to_string(), format!("{}…", "a".repeat(16)));
    }
}
