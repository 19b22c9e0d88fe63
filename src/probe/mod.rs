//! HTTPS reachability probing

pub mod client;
pub mod engine;
pub mod prober;

// Re-export main functionality
pub use client::ReqwestFetcher;
pub use engine::{MetricsSnapshot, ProbeEngine, ProbeMetrics};
pub use prober::{classify, Prober};

use crate::error::Result;
use crate::types::ProbeOutcome;
use async_trait::async_trait;

/// What a successful fetch reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    /// URL reached after following redirects
    pub final_url: String,
}

/// Trait for issuing a single GET and following redirects
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url`; any failure to obtain a response is an `Err`
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

#[async_trait]
impl<T: HttpFetcher + ?Sized> HttpFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        (**self).fetch(url).await
    }
}

/// Receives progress events while the engine runs
pub trait ProbeObserver: Send + Sync {
    /// A probe for `fqdn` is about to be sent
    fn on_start(&self, _fqdn: &str) {}

    /// A probe finished; `done` of `total` candidates are complete
    fn on_outcome(&self, _outcome: &ProbeOutcome, _done: usize, _total: usize) {}
}

/// Observer that ignores every event
pub struct NullObserver;

impl ProbeObserver for NullObserver {}
