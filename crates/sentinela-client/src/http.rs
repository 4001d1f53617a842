use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sentinela_core::Validate;

use crate::error::{ClientError, Result};

/// Longest error body kept in [`ClientError::Http`].
const MAX_ERROR_BODY: usize = 512;

/// Shared `reqwest` client; every backend client clones it.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ClientError::Build(e.to_string()))
}

/// One JSON backend at a fixed base URL. No retries.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    name: &'static str,
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(name: &'static str, base_url: &str, client: reqwest::Client) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(backend = self.name, %url, "GET");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| self.transport(source))?;
        self.decode(resp).await
    }

    /// Validates `body` first; an invalid request is never sent.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Validate + ?Sized,
        T: DeserializeOwned,
    {
        body.validate()?;
        let url = self.url(path);
        tracing::debug!(backend = self.name, %url, "POST");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| self.transport(source))?;
        self.decode(resp).await
    }

    fn transport(&self, source: reqwest::Error) -> ClientError {
        tracing::warn!(backend = self.name, error = %source, "backend request failed");
        ClientError::Transport {
            backend: self.name,
            source,
        }
    }

    async fn decode<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|source| self.transport(source))?;
        if !status.is_success() {
            let mut body = String::from_utf8_lossy(&bytes).into_owned();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            tracing::warn!(backend = self.name, status = status.as_u16(), "backend error");
            return Err(ClientError::Http {
                backend: self.name,
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            backend: self.name,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_cleanly() {
        let backend = HttpBackend::new("ecl", "http://localhost:8001/", reqwest::Client::new());
        assert_eq!(backend.base_url(), "http://localhost:8001");
        assert_eq!(backend.url("/calcular"), "http://localhost:8001/calcular");
        assert_eq!(
            backend.url("analytics/backtest"),
            "http://localhost:8001/analytics/backtest"
        );
    }
}
