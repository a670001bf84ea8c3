use crate::{
    env::EnvManager,
    settings::{
        error::SettingsError, keys, validated::ValidatedSettings, validator::SettingsValidator,
    },
};
use tracing::debug;

/// Raw configuration values, gathered layer by layer before validation.
/// Later layers override earlier ones; unset values keep what is there.
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    pub endpoint: Option<String>,
    pub auth_mode: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub authority: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    pub fetch_mode: Option<String>,
    pub fetch_page_size: Option<String>,
    pub view_page_size: Option<String>,
    pub request_timeout_secs: Option<String>,
    pub retry_attempts: Option<String>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every `TABLESCOPE_*` key present in `env`.
    pub fn from_env(env: &EnvManager) -> Self {
        let read = |key: &str| {
            let value = env.get(key).map(str::to_string);
            if value.is_some() {
                let shown = if EnvManager::is_sensitive(key) {
                    "***"
                } else {
                    value.as_deref().unwrap_or_default()
                };
                debug!("{key}={shown}");
            }
            value
        };

        SettingsBuilder {
            endpoint: read(keys::ENDPOINT),
            auth_mode: read(keys::AUTH_MODE),
            api_key: read(keys::API_KEY),
            access_token: read(keys::ACCESS_TOKEN),
            authority: read(keys::AUTHORITY),
            tenant_id: read(keys::TENANT_ID),
            client_id: read(keys::CLIENT_ID),
            client_secret: read(keys::CLIENT_SECRET),
            scope: read(keys::SCOPE),
            fetch_mode: read(keys::FETCH_MODE),
            fetch_page_size: read(keys::FETCH_PAGE_SIZE),
            view_page_size: read(keys::VIEW_PAGE_SIZE),
            request_timeout_secs: read(keys::REQUEST_TIMEOUT_SECS),
            retry_attempts: read(keys::RETRY_ATTEMPTS),
        }
    }

    pub fn endpoint(mut self, endpoint: Option<String>) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        self
    }

    pub fn fetch_mode(mut self, mode: Option<String>) -> Self {
        if mode.is_some() {
            self.fetch_mode = mode;
        }
        self
    }

    pub fn fetch_page_size(mut self, size: Option<usize>) -> Self {
        if let Some(size) = size {
            self.fetch_page_size = Some(size.to_string());
        }
        self
    }

    pub fn view_page_size(mut self, size: Option<usize>) -> Self {
        if let Some(size) = size {
            self.view_page_size = Some(size.to_string());
        }
        self
    }

    pub fn build(&self) -> Result<ValidatedSettings, SettingsError> {
        SettingsValidator::new().validate(self)
    }
}
