use crate::auth::{TokenProvider, error::AuthError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Tokens are renewed this long before they actually expire.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Longest lifetime trusted from a token response.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct ClientCredentialsConfig {
    pub authority: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// e.g. `api://<backend-client-id>/.default`
    pub scope: String,
}

impl ClientCredentialsConfig {
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn new(access_token: String, expires_in: u64) -> Self {
        let lifetime = Duration::from_secs(expires_in).min(MAX_TOKEN_LIFETIME);
        let now = Instant::now();
        CachedToken {
            access_token,
            expires_at: now.checked_add(lifetime).unwrap_or(now),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_SKEW < self.expires_at
    }
}

/// OAuth2 client-credentials flow against an OIDC token endpoint. Tokens are
/// cached until shortly before expiry, so most acquisitions are silent.
pub struct ClientCredentialsProvider {
    client: reqwest::Client,
    config: ClientCredentialsConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsProvider {
    pub fn new(client: reqwest::Client, config: ClientCredentialsConfig) -> Self {
        ClientCredentialsProvider {
            client,
            config,
            cached: Mutex::new(None),
        }
    }

    /// Provider with its own HTTP client bounded by `timeout`.
    pub fn with_timeout(
        config: ClientCredentialsConfig,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Request(e.to_string()))?;
        Ok(Self::new(client, config))
    }

    async fn request_token(&self) -> Result<CachedToken, AuthError> {
        let url = self.config.token_url();
        debug!(tenant = %self.config.tenant_id, "Requesting access token");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", self.config.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AuthError::Request(e.to_string()))?;
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        info!(expires_in = token.expires_in, "Access token acquired");
        Ok(CachedToken::new(token.access_token, token.expires_in))
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn is_authenticated(&self) -> bool {
        self.cached
            .lock()
            .await
            .as_ref()
            .is_some_and(CachedToken::is_fresh)
    }

    async fn get_access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh()
        {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Forces a new token regardless of the cache.
    async fn sign_in(&self) -> Result<(), AuthError> {
        let token = self.request_token().await?;
        *self.cached.lock().await = Some(token);
        Ok(())
    }
}
