use crate::auth::{TokenProvider, error::AuthError};
use async_trait::async_trait;
use std::sync::RwLock;

/// Provider for a bearer token obtained out of band (configuration, another
/// tool's cache). Signing in only succeeds once a token has been supplied.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        StaticTokenProvider {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
        }
    }

    fn current(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    async fn get_access_token(&self) -> Result<String, AuthError> {
        self.current().ok_or(AuthError::InteractionRequired)
    }

    async fn sign_in(&self) -> Result<(), AuthError> {
        match self.current() {
            Some(_) => Ok(()),
            None => Err(AuthError::InteractionRequired),
        }
    }
}
