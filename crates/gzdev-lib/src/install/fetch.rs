use crate::error::GzdevError;
use std::future::Future;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves raw key material from a URL.
pub trait KeyFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, GzdevError>>;
}

#[derive(Clone, Debug)]
pub struct HttpKeyFetcher {
    client: reqwest::Client,
}

impl HttpKeyFetcher {
    pub fn new() -> Result<Self, GzdevError> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self { client })
    }
}

impl KeyFetcher for HttpKeyFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, GzdevError> {
        let download_error = |reason: String| GzdevError::KeyDownload {
            url: url.to_string(),
            reason,
        };

        tracing::debug!(url, "Fetching signing key");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("HTTP status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        Ok(body.to_vec())
    }
}
