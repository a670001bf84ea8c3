use crate::{
    error::ViewError,
    view::session::{Loader, TableSession},
};
use connectors::{
    adapter::AccessMode,
    auth::{
        SignInGate, TokenProvider,
        client_credentials::{
            ClientCredentialsConfig, ClientCredentialsProvider, DEFAULT_AUTHORITY,
        },
        static_token::StaticTokenProvider,
    },
    http::HttpListSource,
    source::PageSource,
};
use engine_config::settings::{AccessSettings, FetchMode, TokenSource, ValidatedSettings};
use engine_core::{
    fetch::{PageReader, PagedFetcher},
    retry::RetryPolicy,
};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Pause before the single retry of a transient failure.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(2);

pub fn create_token_provider(
    source: &TokenSource,
    timeout: Duration,
) -> Result<Arc<dyn TokenProvider>, ViewError> {
    match source {
        TokenSource::Static(token) => Ok(Arc::new(StaticTokenProvider::new(token))),
        TokenSource::ClientCredentials {
            authority,
            tenant_id,
            client_id,
            client_secret,
            scope,
        } => {
            let config = ClientCredentialsConfig {
                authority: authority
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AUTHORITY.to_string()),
                tenant_id: tenant_id.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                scope: scope.clone(),
            };
            Ok(Arc::new(ClientCredentialsProvider::with_timeout(
                config, timeout,
            )?))
        }
    }
}

pub fn create_access_mode(settings: &ValidatedSettings) -> Result<AccessMode, ViewError> {
    let mode = match &settings.access {
        AccessSettings::Direct { api_key } => {
            AccessMode::direct(&settings.endpoint, api_key.clone())?
        }
        AccessSettings::Authenticated(source) => {
            let provider = create_token_provider(source, settings.request_timeout)?;
            AccessMode::authenticated(&settings.endpoint, SignInGate::new(provider))?
        }
    };
    info!(mode = ?mode, "Access mode selected");
    Ok(mode)
}

pub fn create_source(settings: &ValidatedSettings) -> Result<Arc<dyn PageSource>, ViewError> {
    let mode = create_access_mode(settings)?;
    Ok(Arc::new(HttpListSource::new(mode, settings.request_timeout)?))
}

pub fn retry_policy(settings: &ValidatedSettings) -> RetryPolicy {
    RetryPolicy::new(settings.retry_attempts, RETRY_BASE_DELAY, RETRY_MAX_DELAY)
}

pub fn create_reader(settings: &ValidatedSettings) -> Result<PageReader, ViewError> {
    Ok(PageReader::new(
        create_source(settings)?,
        retry_policy(settings),
        settings.fetch_page_size,
    ))
}

pub fn create_loader(settings: &ValidatedSettings, reader: PageReader) -> Loader {
    match settings.fetch_mode {
        FetchMode::Full => Loader::Full(reader),
        FetchMode::Incremental => Loader::Incremental(PagedFetcher::new(reader)),
    }
}

/// Everything a front end needs to show the configured table.
pub fn create_session(
    settings: &ValidatedSettings,
    cancel: CancellationToken,
) -> Result<TableSession, ViewError> {
    let reader = create_reader(settings)?;
    Ok(TableSession::new(
        create_loader(settings, reader),
        settings.view_page_size,
        cancel,
    ))
}
