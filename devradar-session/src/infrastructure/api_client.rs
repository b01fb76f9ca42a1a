use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{QueryError, SessionError};

/// Thin HTTP client for the devradar backend.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SessionError::Setup(format!("failed to create HTTP client: {err}")))?;

        info!("[ApiClient] Creating new API client with base URL: {}", base_url);

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Build an absolute URL for `path`. Absolute inputs pass through untouched.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `path` with `query` pairs and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, QueryError> {
        let url = self.build_url(path);
        debug!("[ApiClient] GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| self.map_send_error(err))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| QueryError::Decode(err.to_string()));
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(QueryError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> QueryError {
        if err.is_timeout() {
            QueryError::Timeout(self.timeout)
        } else {
            QueryError::from(err)
        }
    }
}
