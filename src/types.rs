//! Core types and structures for subprobe

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Default alphabet for the charset strategy
pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Candidate generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Permutations of a fixed fragment list
    #[default]
    Fragments,
    /// Cartesian products of a character alphabet
    Charset,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Fragments => write!(f, "fragments"),
            Strategy::Charset => write!(f, "charset"),
        }
    }
}

impl Strategy {
    /// What the labels are built from, as shown to the operator
    pub fn source_name(&self) -> &'static str {
        match self {
            Strategy::Fragments => "fragments",
            Strategy::Charset => "character set",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fragments" | "fragment" => Ok(Strategy::Fragments),
            "charset" | "chars" => Ok(Strategy::Charset),
            other => Err(format!("unknown strategy '{}' (expected fragments or charset)", other)),
        }
    }
}

/// Immutable configuration for one enumeration run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub strategy: Strategy,
    pub fragments: Vec<String>,
    pub charset: String,
    pub base_domain: String,
    /// URL prefix marking a parked destination; empty disables the check
    pub redirect_target: String,
    pub check_redirect: bool,
    pub include_empty: bool,
    pub min_len: usize,
    pub max_len: usize,
    pub timeout: Duration,
    /// Probes in flight at once; 1 is strictly sequential
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Fragments,
            fragments: Vec::new(),
            charset: DEFAULT_CHARSET.to_string(),
            base_domain: String::new(),
            redirect_target: String::new(),
            check_redirect: true,
            include_empty: true,
            min_len: 1,
            max_len: 3,
            timeout: Duration::from_secs(5),
            concurrency: 1,
        }
    }
}

impl RunConfig {
    /// The redirect prefix to match, if redirect classification is active
    pub fn redirect_rule(&self) -> Option<&str> {
        if self.check_redirect && !self.redirect_target.is_empty() {
            Some(self.redirect_target.as_str())
        } else {
            None
        }
    }
}

/// Build the fully-qualified name for a label under `base_domain`
pub fn fqdn(label: &str, base_domain: &str) -> String {
    if label.is_empty() {
        base_domain.to_string()
    } else {
        format!("{}.{}", label, base_domain)
    }
}

/// Outcome of probing a single candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ProbeOutcome {
    /// No HTTP response was received
    Unreachable { fqdn: String, error: String },
    /// Final URL landed on the configured parked destination
    Redirected { fqdn: String },
    /// Any HTTP response that is not a parked redirect
    Reachable {
        fqdn: String,
        status: u16,
        final_url: String,
    },
}

impl ProbeOutcome {
    pub fn fqdn(&self) -> &str {
        match self {
            ProbeOutcome::Unreachable { fqdn, .. }
            | ProbeOutcome::Redirected { fqdn }
            | ProbeOutcome::Reachable { fqdn, .. } => fqdn,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }
}

/// Aggregated result of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub base_domain: String,
    pub total: usize,
    /// Reachable FQDNs in probe order
    pub reachable: Vec<String>,
    /// Unreachable FQDNs in probe order
    pub unreachable: Vec<String>,
    pub redirected_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub avg_probe_ms: f64,
    pub slowest: Option<(String, u64)>,
}

impl RunReport {
    /// Start an empty report for `total` candidates
    pub fn new(base_domain: impl Into<String>, total: usize) -> Self {
        let now = Utc::now();
        Self {
            base_domain: base_domain.into(),
            total,
            reachable: Vec::new(),
            unreachable: Vec::new(),
            redirected_count: 0,
            started_at: now,
            finished_at: now,
            avg_probe_ms: 0.0,
            slowest: None,
        }
    }

    /// Fold one outcome into the aggregate lists
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Unreachable { fqdn, .. } => self.unreachable.push(fqdn.clone()),
            ProbeOutcome::Redirected { .. } => self.redirected_count += 1,
            ProbeOutcome::Reachable { fqdn, .. } => self.reachable.push(fqdn.clone()),
        }
    }

    pub fn checked(&self) -> usize {
        self.reachable.len() + self.unreachable.len() + self.redirected_count
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
