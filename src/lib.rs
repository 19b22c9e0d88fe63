//! Subprobe - subdomain candidate enumeration and HTTPS reachability probing
//!
//! Generates a de-duplicated set of subdomain labels under a base domain,
//! either by permuting a fragment list or by combining an alphabet, then
//! probes each name over HTTPS and sorts the results into reachable,
//! redirected (parked) and unreachable.

pub mod config;
pub mod error;
pub mod generate;
pub mod probe;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SubprobeError};
pub use types::{fqdn, ProbeOutcome, RunConfig, RunReport, Strategy};

// Re-export main functionality
pub use generate::{generate_candidates, CandidateGenerator, CharsetGenerator, FragmentGenerator};
pub use probe::{HttpFetcher, ProbeEngine, ProbeObserver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}

/// Generate the candidates for `config` and probe all of them with `fetcher`
pub async fn run<F: HttpFetcher>(config: &RunConfig, fetcher: F, observer: &dyn ProbeObserver) -> RunReport {
    let candidates = generate_candidates(config);
    ProbeEngine::new(fetcher, config).run(&candidates, observer).await
}
