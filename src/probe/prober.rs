//! Single-candidate probe and outcome classification

use std::time::Duration;

use super::{FetchResponse, HttpFetcher};
use crate::error::{Result, SubprobeError};
use crate::types::{fqdn, ProbeOutcome, RunConfig};

/// Probes one label at a time against the base domain
pub struct Prober<F> {
    fetcher: F,
    base_domain: String,
    redirect_rule: Option<String>,
    timeout: Duration,
}

impl<F: HttpFetcher> Prober<F> {
    pub fn new(fetcher: F, config: &RunConfig) -> Self {
        Self {
            fetcher,
            base_domain: config.base_domain.clone(),
            redirect_rule: config.redirect_rule().map(str::to_string),
            timeout: config.timeout,
        }
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Send one GET to `https://{fqdn}/` and classify what came back
    pub async fn probe(&self, label: &str) -> ProbeOutcome {
        let fqdn = fqdn(label, &self.base_domain);
        let url = format!("https://{}/", fqdn);

        // The fetcher carries its own timeout; this bounds fetchers that don't.
        let result = match tokio::time::timeout(self.timeout, self.fetcher.fetch(&url)).await {
            Ok(result) => result,
            Err(_) => Err(SubprobeError::timeout(format!("GET {}", url), self.timeout.as_secs())),
        };

        classify(fqdn, result, self.redirect_rule.as_deref())
    }
}

/// Map a fetch result onto the three probe outcomes.
///
/// Only a literal prefix match of the final URL counts as a parked redirect;
/// status codes and intermediate hops are not considered.
pub fn classify(
    fqdn: String,
    result: Result<FetchResponse>,
    redirect_rule: Option<&str>,
) -> ProbeOutcome {
    match result {
        Err(e) => ProbeOutcome::Unreachable {
            fqdn,
            error: e.to_string(),
        },
        Ok(response) => match redirect_rule {
            Some(prefix) if response.final_url.starts_with(prefix) => ProbeOutcome::Redirected { fqdn },
            _ => ProbeOutcome::Reachable {
                fqdn,
                status: response.status,
                final_url: response.final_url,
            },
        },
    }
}
