use crate::auth::error::AuthError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod client_credentials;
pub mod error;
pub mod static_token;

/// Identity provider boundary: something that can hand out a bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn is_authenticated(&self) -> bool;

    /// Returns a token, silently (from cache) when possible.
    async fn get_access_token(&self) -> Result<String, AuthError>;

    /// Runs the provider's sign-in flow.
    async fn sign_in(&self) -> Result<(), AuthError>;
}

/// Blocking precondition in front of every data request: no token, no request.
#[derive(Clone)]
pub struct SignInGate {
    provider: Arc<dyn TokenProvider>,
}

impl SignInGate {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        SignInGate { provider }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.provider.is_authenticated().await
    }

    pub async fn sign_in(&self) -> Result<(), AuthError> {
        self.provider.sign_in().await
    }

    /// Token for the next request. A provider that is not signed in gets one
    /// sign-in attempt before the request is refused.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        if !self.provider.is_authenticated().await {
            debug!("No active session, attempting sign-in");
            if let Err(err) = self.provider.sign_in().await {
                warn!("Sign-in failed: {err}");
                return Err(err);
            }
        }

        self.provider.get_access_token().await
    }
}
