//! HTTP fetcher implementation
//!
//! One call to [`PageFetcher::fetch`] is one round trip for one post ID.
//! Retrying is the caller's job; the fetcher only classifies the result:
//!
//! | Condition | Result |
//! |-----------|--------|
//! | HTTP 200, extraction succeeds | `Ok(Found)` |
//! | HTTP 200, extraction fails | `Err(Extract)` (transient) |
//! | HTTP 404 | `Ok(NotFound)` |
//! | Connection, timeout, TLS, DNS, body read | `Err(Transport)` (transient) |
//! | Any other status | `Err(UnexpectedStatus)` (fatal) |

use crate::config::{Config, RemoteConfig};
use crate::extract::PageExtractor;
use crate::model::FetchOutcome;
use crate::{ExtractError, MirrorError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failure of a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request for post {id} failed: {source}")]
    Transport {
        id: i64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not extract post {id}: {source}")]
    Extract {
        id: i64,
        #[source]
        source: ExtractError,
    },

    #[error("Unexpected HTTP status {status} for post {id}")]
    UnexpectedStatus { id: i64, status: u16 },
}

impl FetchError {
    /// Returns true if the attempt should be retried
    ///
    /// Transport and extraction failures are retried; an unexpected status
    /// aborts the scan.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::UnexpectedStatus { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The remote catalog configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &RemoteConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .https_only(config.scheme == "https")
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages by post ID
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: Url,
    extractor: PageExtractor,
}

impl PageFetcher {
    /// Creates a fetcher for the configured catalog
    pub fn new(config: &Config) -> Result<Self, MirrorError> {
        let client = build_http_client(&config.remote)?;
        let extractor = PageExtractor::new(&config.selectors)?;
        Self::with_client(client, &config.remote, extractor)
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(
        client: Client,
        remote: &RemoteConfig,
        extractor: PageExtractor,
    ) -> Result<Self, MirrorError> {
        let base_url = Url::parse(&remote.base_url())?;
        Ok(Self {
            client,
            base_url,
            extractor,
        })
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// URL of the listing page for `id`
    pub fn view_url(&self, id: i64) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/view/{}", id));
        url
    }

    /// Performs one fetch attempt for `id`
    pub async fn fetch(&self, id: i64) -> Result<FetchOutcome, FetchError> {
        let response = self
            .client
            .get(self.view_url(id))
            .send()
            .await
            .map_err(|source| FetchError::Transport { id, source })?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|source| FetchError::Transport { id, source })?;

                self.extractor
                    .extract(&body)
                    .map(FetchOutcome::Found)
                    .map_err(|source| FetchError::Extract { id, source })
            }
            StatusCode::NOT_FOUND => Ok(FetchOutcome::NotFound),
            status => Err(FetchError::UnexpectedStatus {
                id,
                status: status.as_u16(),
            }),
        }
    }
}
