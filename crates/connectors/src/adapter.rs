use crate::{auth::SignInGate, error::AdapterError};
use reqwest::{RequestBuilder, Url};
use std::fmt;

/// How the list endpoint is reached. Chosen once at startup; the two
/// deployments never coexist.
#[derive(Clone)]
pub enum AccessMode {
    /// Token-gated calls through the API path; every request carries
    /// `Authorization: Bearer <token>`.
    Authenticated { endpoint: Url, gate: SignInGate },

    /// Calls against a fixed function URL. The key, when configured, travels
    /// as the `code` query parameter.
    Direct {
        endpoint: Url,
        api_key: Option<String>,
    },
}

impl AccessMode {
    pub fn authenticated(endpoint: &str, gate: SignInGate) -> Result<Self, AdapterError> {
        Ok(AccessMode::Authenticated {
            endpoint: parse_endpoint(endpoint)?,
            gate,
        })
    }

    pub fn direct(endpoint: &str, api_key: Option<String>) -> Result<Self, AdapterError> {
        Ok(AccessMode::Direct {
            endpoint: parse_endpoint(endpoint)?,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        match self {
            AccessMode::Authenticated { endpoint, .. } => endpoint,
            AccessMode::Direct { endpoint, .. } => endpoint,
        }
    }

    pub fn requires_token(&self) -> bool {
        matches!(self, AccessMode::Authenticated { .. })
    }

    /// Extra query parameters the mode contributes to every request.
    pub fn query_params(&self) -> Vec<(&'static str, &str)> {
        match self {
            AccessMode::Direct {
                api_key: Some(key), ..
            } => vec![("code", key.as_str())],
            _ => Vec::new(),
        }
    }

    /// Ensures a token is available without sending a data request.
    pub async fn authorize(&self) -> Result<(), AdapterError> {
        match self {
            AccessMode::Authenticated { gate, .. } => {
                gate.access_token().await?;
                Ok(())
            }
            AccessMode::Direct { .. } => Ok(()),
        }
    }

    /// Attaches the mode's credential to an outgoing request.
    pub async fn authorize_request(
        &self,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, AdapterError> {
        match self {
            AccessMode::Authenticated { gate, .. } => {
                let token = gate.access_token().await?;
                Ok(request.bearer_auth(token))
            }
            AccessMode::Direct { .. } => Ok(request),
        }
    }
}

impl fmt::Debug for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Authenticated { endpoint, .. } => f
                .debug_struct("Authenticated")
                .field("endpoint", &redacted(endpoint))
                .finish_non_exhaustive(),
            AccessMode::Direct { endpoint, api_key } => f
                .debug_struct("Direct")
                .field("endpoint", &redacted(endpoint))
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, AdapterError> {
    let url = Url::parse(endpoint).map_err(|e| AdapterError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AdapterError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Endpoint without query string or credentials, safe for logs.
pub fn redacted(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    let _ = clean.set_password(None);
    let _ = clean.set_username("");
    clean.to_string()
}
