use crate::settings::{AuthMode, FetchMode};
use std::{fmt, num::NonZeroUsize, time::Duration};

/// Where an authenticated deployment gets its bearer token.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    Static(String),
    ClientCredentials {
        /// `None` uses the provider's default authority.
        authority: Option<String>,
        tenant_id: String,
        client_id: String,
        client_secret: String,
        scope: String,
    },
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static(***)"),
            TokenSource::ClientCredentials {
                authority,
                tenant_id,
                client_id,
                scope,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("authority", authority)
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("scope", scope)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum AccessSettings {
    Direct { api_key: Option<String> },
    Authenticated(TokenSource),
}

impl AccessSettings {
    pub fn mode(&self) -> AuthMode {
        match self {
            AccessSettings::Direct { .. } => AuthMode::Direct,
            AccessSettings::Authenticated(_) => AuthMode::Authenticated,
        }
    }
}

impl fmt::Debug for AccessSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessSettings::Direct { api_key } => f
                .debug_struct("Direct")
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .finish(),
            AccessSettings::Authenticated(source) => {
                f.debug_tuple("Authenticated").field(source).finish()
            }
        }
    }
}

/// Immutable, validated configuration for one run.
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
    /// List endpoint, `http` or `https`.
    pub endpoint: String,
    pub access: AccessSettings,
    pub fetch_mode: FetchMode,
    /// `pageSize` sent to the list endpoint.
    pub fetch_page_size: NonZeroUsize,
    /// Rows per displayed page.
    pub view_page_size: NonZeroUsize,
    pub request_timeout: Duration,
    /// Total attempts per request, the first one included.
    pub retry_attempts: usize,
}

impl ValidatedSettings {
    pub fn auth_mode(&self) -> AuthMode {
        self.access.mode()
    }

    pub fn is_incremental(&self) -> bool {
        self.fetch_mode == FetchMode::Incremental
    }
}
