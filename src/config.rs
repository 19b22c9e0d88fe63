//! Run configuration from flags, environment and an optional JSON file
//!
//! Precedence is flag > environment variable > config file > default. Clap
//! resolves the first two (every option carries an `env` name); the file and
//! the defaults are merged in `Cli::into_config`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, SubprobeError};
use crate::generate::{generator_for, MAX_CANDIDATES, MAX_LABEL_LEN};
use crate::{config_error, validation_error};
use crate::types::{RunConfig, Strategy};

/// Command line interface
#[derive(Parser, Debug, Default)]
#[command(
    name = "subprobe",
    author,
    version,
    about = "Enumerate candidate subdomains and probe them over HTTPS"
)]
pub struct Cli {
    /// Base domain the candidates are tested under
    #[arg(short = 'd', long = "domain", env = "SUBPROBE_DOMAIN")]
    pub domain: Option<String>,

    /// Generation strategy: fragments or charset
    #[arg(short = 's', long = "strategy", env = "SUBPROBE_STRATEGY")]
    pub strategy: Option<Strategy>,

    /// Comma separated fragment list (fragments strategy)
    #[arg(
        short = 'f',
        long = "fragments",
        env = "SUBPROBE_FRAGMENTS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub fragments: Option<Vec<String>>,

    /// Alphabet for the charset strategy
    #[arg(short = 'c', long = "charset", env = "SUBPROBE_CHARSET")]
    pub charset: Option<String>,

    /// URL prefix of a parked-domain landing page; empty disables the check
    #[arg(long = "redirect-url", env = "SUBPROBE_REDIRECT_URL")]
    pub redirect_url: Option<String>,

    /// Classify probes landing on --redirect-url as redirected
    #[arg(long = "check-redirect", env = "SUBPROBE_CHECK_REDIRECT", action = ArgAction::Set)]
    pub check_redirect: Option<bool>,

    /// Also probe the bare base domain (requires --min-len 0)
    #[arg(long = "include-empty", env = "SUBPROBE_INCLUDE_EMPTY", action = ArgAction::Set)]
    pub include_empty: Option<bool>,

    /// Minimum label length (characters or fragments)
    #[arg(long = "min-len", env = "SUBPROBE_MIN_LEN")]
    pub min_len: Option<usize>,

    /// Maximum label length (characters or fragments)
    #[arg(long = "max-len", env = "SUBPROBE_MAX_LEN")]
    pub max_len: Option<usize>,

    /// Per-probe timeout in seconds
    #[arg(short = 't', long = "timeout", env = "SUBPROBE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Probes in flight at once (1 = sequential)
    #[arg(short = 'j', long = "concurrency", env = "SUBPROBE_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// JSON config file
    #[arg(long = "config", env = "SUBPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the candidate names and exit without probing
    #[arg(long = "list")]
    pub list: bool,

    /// Print the final report as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Debug logging, including unreachable candidates
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Contents of a `--config` file; every key is optional
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub strategy: Option<Strategy>,
    pub fragments: Option<Vec<String>>,
    pub charset: Option<String>,
    pub base_domain: Option<String>,
    pub redirect_url: Option<String>,
    pub check_redirect: Option<bool>,
    pub include_empty: Option<bool>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
}

impl FileConfig {
    /// Read and parse a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SubprobeError::io(e.to_string(), Some(display.clone())))?;
        serde_json::from_str(&text).map_err(|e| SubprobeError::parse(format!("{}: {}", display, e)))
    }
}

impl Cli {
    /// Merge flags, environment, config file and defaults into a validated `RunConfig`
    pub fn into_config(self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file).validate()
    }

    fn merge(self, file: FileConfig) -> RunConfig {
        let defaults = RunConfig::default();

        let include_empty = self.include_empty.or(file.include_empty);
        let min_len = self.min_len.or(file.min_len).unwrap_or(defaults.min_len);
        if include_empty == Some(true) && min_len > 0 {
            tracing::warn!(min_len, "include-empty is ignored unless min-len is 0");
        }

        RunConfig {
            strategy: self.strategy.or(file.strategy).unwrap_or(defaults.strategy),
            fragments: self.fragments.or(file.fragments).unwrap_or(defaults.fragments),
            charset: self.charset.or(file.charset).unwrap_or(defaults.charset),
            base_domain: self.domain.or(file.base_domain).unwrap_or(defaults.base_domain),
            redirect_target: self.redirect_url.or(file.redirect_url).unwrap_or(defaults.redirect_target),
            check_redirect: self.check_redirect.or(file.check_redirect).unwrap_or(defaults.check_redirect),
            include_empty: include_empty.unwrap_or(defaults.include_empty),
            min_len,
            max_len: self.max_len.or(file.max_len).unwrap_or(defaults.max_len),
            timeout: self
                .timeout
                .or(file.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            concurrency: self.concurrency.or(file.concurrency).unwrap_or(defaults.concurrency),
        }
    }
}

impl RunConfig {
    /// Normalize and check the configuration before anything runs
    pub fn validate(mut self) -> Result<Self> {
        self.base_domain = self.base_domain.trim().trim_end_matches('.').to_lowercase();
        validate_base_domain(&self.base_domain)?;

        match self.strategy {
            Strategy::Fragments => {
                if self.fragments.is_empty() {
                    return Err(config_error!("fragments strategy needs at least one fragment"));
                }
                if self.fragments.iter().any(|f| f.is_empty()) {
                    return Err(config_error!("fragments must not be empty strings"));
                }
                let label_chars = label_chars()?;
                if let Some(bad) = self.fragments.iter().find(|f| !label_chars.is_match(f)) {
                    return Err(validation_error!("fragment '{}' contains characters not allowed in a label", bad));
                }

                let mut lengths: Vec<usize> = self.fragments.iter().map(|f| f.len()).collect();
                lengths.sort_unstable_by(|a, b| b.cmp(a));
                let longest: usize = lengths.iter().take(self.max_len).sum();
                if longest > MAX_LABEL_LEN {
                    return Err(validation_error!(
                        "labels of up to {} fragments reach {} characters (max {}); lower --max-len",
                        self.max_len.min(lengths.len()),
                        longest,
                        MAX_LABEL_LEN
                    ));
                }
            }
            Strategy::Charset => {
                if self.charset.is_empty() {
                    return Err(config_error!("charset strategy needs a non-empty alphabet"));
                }
                if !label_chars()?.is_match(&self.charset) {
                    return Err(validation_error!(
                        "charset '{}' contains characters not allowed in a label",
                        self.charset
                    ));
                }
                if self.max_len > MAX_LABEL_LEN {
                    return Err(validation_error!(
                        "max-len {} exceeds the {} character label limit",
                        self.max_len,
                        MAX_LABEL_LEN
                    ));
                }
            }
        }

        if self.timeout.is_zero() {
            return Err(config_error!("timeout must be at least one second"));
        }
        if self.concurrency == 0 {
            return Err(config_error!("concurrency must be at least 1"));
        }

        if !self.redirect_target.is_empty() {
            reqwest::Url::parse(&self.redirect_target)
                .map_err(|e| config_error!("invalid redirect URL '{}': {}", self.redirect_target, e))?;
        }

        let estimate = generator_for(&self).estimate(self.min_len, self.max_len, self.include_empty);
        match estimate {
            Some(count) if count <= MAX_CANDIDATES => {}
            _ => {
                return Err(config_error!(
                    "more than {} candidates; lower --max-len",
                    MAX_CANDIDATES
                ))
            }
        }

        Ok(self)
    }
}

/// Letters, digits and hyphens only
fn label_chars() -> Result<Regex> {
    Regex::new(r"^[A-Za-z0-9-]+$").map_err(|e| SubprobeError::internal(e.to_string()))
}

fn validate_base_domain(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(config_error!("base domain is required (--domain or SUBPROBE_DOMAIN)"));
    }
    if domain.len() > 253 {
        return Err(config_error!("base domain too long (max 253 characters)"));
    }

    let hostname = Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$")
        .map_err(|e| SubprobeError::internal(e.to_string()))?;
    if !hostname.is_match(domain) {
        return Err(config_error!("'{}' is not a valid domain name", domain));
    }

    Ok(())
}
