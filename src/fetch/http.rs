use super::FetchService;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches source images over HTTP with a per-request timeout.
///
/// Single attempt only: transport failures, elapsed timeouts, and
/// non-success statuses all come back as [`Error::Fetch`].
pub struct HttpFetchClient {
    client: Client,
    timeout: Duration,
}

impl HttpFetchClient {
    pub fn new(timeout: Duration) -> Self {
        Self::new_with_client(timeout, Client::new())
    }

    /// Build on an existing client to share its connection pool.
    pub fn new_with_client(timeout: Duration, client: Client) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl FetchService for HttpFetchClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching image from {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("reading body from {} failed: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}
