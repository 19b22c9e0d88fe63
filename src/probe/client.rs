//! reqwest-backed fetcher

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;

use super::{FetchResponse, HttpFetcher};
use crate::error::{Result, SubprobeError};

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 30;

/// HTTPS fetcher on top of a shared reqwest client
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("subprobe/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SubprobeError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;

        Ok(FetchResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
        })
    }
}
