use crate::settings::error::SettingsError;
use std::{fmt, str::FromStr};

pub mod builder;
pub mod error;
pub mod validated;
pub mod validator;

pub use builder::SettingsBuilder;
pub use validated::{AccessSettings, TokenSource, ValidatedSettings};
pub use validator::SettingsValidator;

/// Environment keys, all prefixed `TABLESCOPE_`.
pub mod keys {
    pub const ENDPOINT: &str = "TABLESCOPE_ENDPOINT";
    pub const AUTH_MODE: &str = "TABLESCOPE_AUTH_MODE";
    pub const API_KEY: &str = "TABLESCOPE_API_KEY";
    pub const ACCESS_TOKEN: &str = "TABLESCOPE_ACCESS_TOKEN";
    pub const AUTHORITY: &str = "TABLESCOPE_AUTHORITY";
    pub const TENANT_ID: &str = "TABLESCOPE_TENANT_ID";
    pub const CLIENT_ID: &str = "TABLESCOPE_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "TABLESCOPE_CLIENT_SECRET";
    pub const SCOPE: &str = "TABLESCOPE_SCOPE";
    pub const FETCH_MODE: &str = "TABLESCOPE_FETCH_MODE";
    pub const FETCH_PAGE_SIZE: &str = "TABLESCOPE_FETCH_PAGE_SIZE";
    pub const VIEW_PAGE_SIZE: &str = "TABLESCOPE_VIEW_PAGE_SIZE";
    pub const REQUEST_TIMEOUT_SECS: &str = "TABLESCOPE_REQUEST_TIMEOUT_SECS";
    pub const RETRY_ATTEMPTS: &str = "TABLESCOPE_RETRY_ATTEMPTS";
}

pub const DEFAULT_FETCH_PAGE_SIZE: usize = 100;
pub const DEFAULT_VIEW_PAGE_SIZE: usize = 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: usize = 2;

/// How rows reach the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Follow the cursor to the end once, then work in memory.
    #[default]
    Full,
    /// One remote page at a time.
    Incremental,
}

impl FromStr for FetchMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(FetchMode::Full),
            "incremental" | "paged" => Ok(FetchMode::Incremental),
            _ => Err(SettingsError::InvalidValue {
                key: keys::FETCH_MODE,
                value: s.to_string(),
                reason: "expected 'full' or 'incremental'".into(),
            }),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Full => f.write_str("full"),
            FetchMode::Incremental => f.write_str("incremental"),
        }
    }
}

/// Deployment flavour of the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Direct,
    Authenticated,
}

impl FromStr for AuthMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(AuthMode::Direct),
            "authenticated" | "auth" => Ok(AuthMode::Authenticated),
            _ => Err(SettingsError::InvalidValue {
                key: keys::AUTH_MODE,
                value: s.to_string(),
                reason: "expected 'direct' or 'authenticated'".into(),
            }),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Direct => f.write_str("direct"),
            AuthMode::Authenticated => f.write_str("authenticated"),
        }
    }
}
