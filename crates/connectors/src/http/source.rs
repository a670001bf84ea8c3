use crate::{
    adapter::{AccessMode, redacted},
    error::AdapterError,
    source::PageSource,
};
use async_trait::async_trait;
use model::{pagination::cursor::Cursor, records::page::ListPage};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Error bodies are diagnostics; keep them short enough for a log line.
const MAX_ERROR_BODY: usize = 2048;

/// The list endpoint over HTTP:
/// `GET <endpoint>?pageSize=<n>&token=<cursor>[&code=<key>]`.
pub struct HttpListSource {
    client: reqwest::Client,
    mode: AccessMode,
    timeout: Duration,
}

impl HttpListSource {
    pub fn new(mode: AccessMode, timeout: Duration) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Client(e.to_string()))?;

        Ok(Self::with_client(client, mode, timeout))
    }

    pub fn with_client(client: reqwest::Client, mode: AccessMode, timeout: Duration) -> Self {
        HttpListSource {
            client,
            mode,
            timeout,
        }
    }

    pub fn mode(&self) -> &AccessMode {
        &self.mode
    }

    pub fn request_url(&self, page_size: usize, cursor: &Cursor) -> Url {
        let mut url = self.mode.endpoint().clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &page_size.to_string());
            if let Some(token) = cursor.token() {
                query.append_pair("token", token);
            }
            for (name, value) in self.mode.query_params() {
                query.append_pair(name, value);
            }
        }
        url
    }

    fn map_send_error(&self, err: reqwest::Error) -> AdapterError {
        if err.is_timeout() {
            AdapterError::Timeout(self.timeout)
        } else {
            AdapterError::Transport(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl PageSource for HttpListSource {
    async fn fetch_page(
        &self,
        page_size: usize,
        cursor: &Cursor,
    ) -> Result<ListPage, AdapterError> {
        // The token is acquired before anything goes on the wire.
        let request = self
            .mode
            .authorize_request(self.client.get(self.request_url(page_size, cursor)))
            .await?;

        debug!(endpoint = %self.describe(), page_size, cursor = %cursor, "Requesting page");

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str::<ListPage>(&body).map_err(|e| AdapterError::Malformed(e.to_string()))
    }

    async fn authorize(&self) -> Result<(), AdapterError> {
        self.mode.authorize().await
    }

    fn describe(&self) -> String {
        redacted(self.mode.endpoint())
    }
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() <= max {
        return body;
    }
    let mut cut = max;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body.truncate(cut);
    body.push('…');
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(api_key: Option<&str>) -> HttpListSource {
        let mode =
            AccessMode::direct("https://fn.example.net/api/list", api_key.map(String::from))
                .unwrap();
        HttpListSource::new(mode, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_first_page_url_has_no_token() {
        let url = source(None).request_url(20, &Cursor::None);
        assert_eq!(url.as_str(), "https://fn.example.net/api/list?pageSize=20");
    }

    #[test]
    fn test_follow_up_url_carries_token_and_key() {
        let url = source(Some("k3y")).request_url(100, &Cursor::Token("a b&c".into()));
        assert_eq!(
            url.as_str(),
            "https://fn.example.net/api/list?pageSize=100&token=a+b%26c&code=k3y"
        );
    }

    #[test]
    fn test_describe_is_redacted() {
        assert_eq!(source(Some("k3y")).describe(), "https://fn.example.net/api/list");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short".into(), 10), "short");
        assert_eq!(truncate("ééé".into(), 3), "é…");
    }
}
