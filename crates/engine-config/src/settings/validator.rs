use crate::settings::{
    AuthMode, DEFAULT_FETCH_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_VIEW_PAGE_SIZE, FetchMode,
    builder::SettingsBuilder,
    error::SettingsError,
    keys,
    validated::{AccessSettings, TokenSource, ValidatedSettings},
};
use std::{num::NonZeroUsize, str::FromStr, time::Duration};
use tracing::{info, warn};

/// The list endpoint caps `pageSize`; larger values are accepted but clamped
/// server-side.
const LARGE_PAGE_SIZE: usize = 1000;

/// Turns raw settings into [`ValidatedSettings`], reporting every problem at
/// once.
#[derive(Debug, Default)]
pub struct SettingsValidator;

impl SettingsValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, raw: &SettingsBuilder) -> Result<ValidatedSettings, SettingsError> {
        let mut errors: Vec<String> = Vec::new();

        let endpoint = self.validate_endpoint(raw, &mut errors);
        let access = self.validate_access(raw, &mut errors);
        let fetch_mode = parse_or(raw.fetch_mode.as_deref(), FetchMode::default(), &mut errors);
        let fetch_page_size = self.page_size(
            keys::FETCH_PAGE_SIZE,
            raw.fetch_page_size.as_deref(),
            DEFAULT_FETCH_PAGE_SIZE,
            &mut errors,
        );
        let view_page_size = self.page_size(
            keys::VIEW_PAGE_SIZE,
            raw.view_page_size.as_deref(),
            DEFAULT_VIEW_PAGE_SIZE,
            &mut errors,
        );
        let timeout_secs = self.positive(
            keys::REQUEST_TIMEOUT_SECS,
            raw.request_timeout_secs.as_deref(),
            DEFAULT_REQUEST_TIMEOUT_SECS as usize,
            &mut errors,
        );
        let retry_attempts = self.positive(
            keys::RETRY_ATTEMPTS,
            raw.retry_attempts.as_deref(),
            DEFAULT_RETRY_ATTEMPTS,
            &mut errors,
        );

        let (Some(endpoint), Some(access), Some(fetch_page_size), Some(view_page_size)) =
            (endpoint, access, fetch_page_size, view_page_size)
        else {
            return Err(SettingsError::ValidationFailed(errors));
        };
        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        let validated = ValidatedSettings {
            endpoint,
            access,
            fetch_mode,
            fetch_page_size,
            view_page_size,
            request_timeout: Duration::from_secs(timeout_secs as u64),
            retry_attempts,
        };
        self.log_validated_settings(&validated);
        Ok(validated)
    }

    fn validate_endpoint(&self, raw: &SettingsBuilder, errors: &mut Vec<String>) -> Option<String> {
        let Some(endpoint) = raw.endpoint.as_deref().map(str::trim) else {
            errors.push(format!("{} is required", keys::ENDPOINT));
            return None;
        };

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            errors.push(format!("{} must be an http(s) URL", keys::ENDPOINT));
            return None;
        }
        Some(endpoint.to_string())
    }

    fn validate_access(
        &self,
        raw: &SettingsBuilder,
        errors: &mut Vec<String>,
    ) -> Option<AccessSettings> {
        let mode = parse_or(raw.auth_mode.as_deref(), AuthMode::default(), errors);

        match mode {
            AuthMode::Direct => {
                if raw.access_token.is_some() || raw.client_id.is_some() {
                    warn!("Token settings are ignored in direct mode");
                }
                Some(AccessSettings::Direct {
                    api_key: raw.api_key.clone(),
                })
            }
            AuthMode::Authenticated => {
                if raw.api_key.is_some() {
                    errors.push(format!(
                        "{} is only valid in direct mode; authenticated calls carry a bearer token",
                        keys::API_KEY
                    ));
                }
                self.token_source(raw, errors)
                    .map(AccessSettings::Authenticated)
            }
        }
    }

    fn token_source(&self, raw: &SettingsBuilder, errors: &mut Vec<String>) -> Option<TokenSource> {
        if let Some(token) = &raw.access_token {
            return Some(TokenSource::Static(token.clone()));
        }

        let credentials = [
            (keys::TENANT_ID, &raw.tenant_id),
            (keys::CLIENT_ID, &raw.client_id),
            (keys::CLIENT_SECRET, &raw.client_secret),
            (keys::SCOPE, &raw.scope),
        ];
        let missing: Vec<&str> = credentials
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect();

        if missing.len() == credentials.len() {
            errors.push(format!(
                "authenticated mode needs {} or client credentials",
                keys::ACCESS_TOKEN
            ));
            return None;
        }
        if !missing.is_empty() {
            errors.push(format!(
                "incomplete client credentials, missing {}",
                missing.join(", ")
            ));
            return None;
        }

        Some(TokenSource::ClientCredentials {
            authority: raw.authority.clone(),
            tenant_id: raw.tenant_id.clone().unwrap_or_default(),
            client_id: raw.client_id.clone().unwrap_or_default(),
            client_secret: raw.client_secret.clone().unwrap_or_default(),
            scope: raw.scope.clone().unwrap_or_default(),
        })
    }

    fn page_size(
        &self,
        key: &'static str,
        value: Option<&str>,
        default: usize,
        errors: &mut Vec<String>,
    ) -> Option<NonZeroUsize> {
        let size = self.positive(key, value, default, errors);
        if key == keys::FETCH_PAGE_SIZE && size > LARGE_PAGE_SIZE {
            warn!("{key}={size} is very large; the endpoint may clamp it");
        }
        NonZeroUsize::new(size)
    }

    /// Parses a strictly positive integer. Problems are recorded and the
    /// default is returned so validation can continue.
    fn positive(
        &self,
        key: &'static str,
        value: Option<&str>,
        default: usize,
        errors: &mut Vec<String>,
    ) -> usize {
        let Some(value) = value else {
            return default;
        };

        match value.trim().parse::<usize>() {
            Ok(0) => {
                errors.push(format!("{key} must be greater than zero"));
                default
            }
            Ok(n) => n,
            Err(e) => {
                errors.push(format!("{key}: invalid number '{value}' ({e})"));
                default
            }
        }
    }

    fn log_validated_settings(&self, settings: &ValidatedSettings) {
        info!(
            mode = %settings.auth_mode(),
            fetch_mode = %settings.fetch_mode,
            fetch_page_size = settings.fetch_page_size.get(),
            view_page_size = settings.view_page_size.get(),
            timeout_secs = settings.request_timeout.as_secs(),
            retry_attempts = settings.retry_attempts,
            "Settings validated"
        );
    }
}

fn parse_or<T>(value: Option<&str>, default: T, errors: &mut Vec<String>) -> T
where
    T: FromStr<Err = SettingsError>,
{
    match value.map(str::parse::<T>) {
        None => default,
        Some(Ok(parsed)) => parsed,
        Some(Err(e)) => {
            errors.push(e.to_string());
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnvManager;

    fn direct() -> SettingsBuilder {
        SettingsBuilder {
            endpoint: Some("https://fn.example.net/api/list".into()),
            ..SettingsBuilder::default()
        }
    }

    fn failures(raw: &SettingsBuilder) -> Vec<String> {
        match raw.build() {
            Err(SettingsError::ValidationFailed(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let settings = direct().build().unwrap();
        assert_eq!(settings.fetch_mode, FetchMode::Full);
        assert_eq!(settings.fetch_page_size.get(), 100);
        assert_eq!(settings.view_page_size.get(), 20);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.retry_attempts, 2);
        assert_eq!(settings.access, AccessSettings::Direct { api_key: None });
    }

    #[test]
    fn test_missing_endpoint() {
        let errors = failures(&SettingsBuilder::default());
        assert!(errors[0].contains(keys::ENDPOINT));
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let raw = SettingsBuilder {
            endpoint: Some("/api/list".into()),
            ..SettingsBuilder::default()
        };
        assert!(failures(&raw)[0].contains("http"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let raw = direct().view_page_size(Some(0));
        let errors = failures(&raw);
        assert!(errors[0].contains(keys::VIEW_PAGE_SIZE));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let raw = SettingsBuilder {
            fetch_mode: Some("stream".into()),
            auth_mode: Some("sso".into()),
            ..direct()
        };
        assert_eq!(failures(&raw).len(), 2);
    }

    #[test]
    fn test_authenticated_needs_token_source() {
        let raw = SettingsBuilder {
            auth_mode: Some("authenticated".into()),
            ..direct()
        };
        assert!(failures(&raw)[0].contains(keys::ACCESS_TOKEN));

        let partial = SettingsBuilder {
            tenant_id: Some("t".into()),
            client_id: Some("c".into()),
            ..raw.clone()
        };
        let errors = failures(&partial);
        assert!(errors[0].contains(keys::CLIENT_SECRET));
        assert!(errors[0].contains(keys::SCOPE));
    }

    #[test]
    fn test_api_key_in_authenticated_mode_rejected() {
        let raw = SettingsBuilder {
            auth_mode: Some("authenticated".into()),
            access_token: Some("token".into()),
            api_key: Some("k3y".into()),
            ..direct()
        };
        assert!(failures(&raw)[0].contains(keys::API_KEY));
    }

    #[test]
    fn test_client_credentials() {
        let raw = SettingsBuilder {
            auth_mode: Some("authenticated".into()),
            tenant_id: Some("tenant".into()),
            client_id: Some("client".into()),
            client_secret: Some("secret".into()),
            scope: Some("api://backend/.default".into()),
            ..direct()
        };
        let settings = raw.build().unwrap();
        assert_eq!(settings.auth_mode(), AuthMode::Authenticated);
        assert!(matches!(
            settings.access,
            AccessSettings::Authenticated(TokenSource::ClientCredentials { authority: None, .. })
        ));
        assert!(!format!("{settings:?}").contains("secret\""));
    }

    #[test]
    fn test_flags_override_env() {
        let mut env = EnvManager::empty();
        env.set(keys::ENDPOINT, "https://env.example.net/list");
        env.set(keys::FETCH_MODE, "full");
        env.set(keys::API_KEY, "k3y");

        let settings = SettingsBuilder::from_env(&env)
            .endpoint(Some("https://flag.example.net/list".into()))
            .fetch_mode(Some("incremental".into()))
            .fetch_page_size(None)
            .build()
            .unwrap();

        assert_eq!(settings.endpoint, "https://flag.example.net/list");
        assert!(settings.is_incremental());
        assert_eq!(settings.fetch_page_size.get(), 100);
        assert_eq!(
            settings.access,
            AccessSettings::Direct {
                api_key: Some("k3y".into())
            }
        );
        assert!(!format!("{:?}", settings.access).contains("k3y"));
    }
}
