//! HTTP client for fetching monthly trip-data files

use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Configuration for the dataset HTTP client
#[derive(Debug, Clone)]
pub struct DatasetClientConfig {
    /// Bound on establishing the connection. The transfer itself is not
    /// bounded; a slow download takes as long as it takes.
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for DatasetClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            user_agent: format!("tlc-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client that downloads one dataset file per run
pub struct DatasetClient {
    client: Client,
}

impl DatasetClient {
    /// Create a client with default configuration
    pub fn new() -> Self {
        Self::with_config(DatasetClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: DatasetClientConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Download the file at `url` fully into memory.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let url = Url::parse(url)
            .map_err(|e| Error::connectivity(format!("invalid dataset URL '{url}': {e}")))?;

        info!(%url, "downloading dataset");
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::connectivity(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::connectivity(format!("{url} returned HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::connectivity(format!("download from {url} failed: {e}")))?;

        debug!(
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "download complete"
        );

        Ok(body)
    }
}

impl Default for DatasetClient {
    fn default() -> Self {
        Self::new()
    }
}
