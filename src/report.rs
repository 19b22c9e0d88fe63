//! Console output: progress bar, per-probe lines and the final summary

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::probe::ProbeObserver;
use crate::types::{ProbeOutcome, RunReport};

pub const SUMMARY_HEADER: &str = "--- Reachable Domains (without redirect) ---";

/// Line printed for a finished probe; unreachable candidates stay silent
pub fn outcome_line(outcome: &ProbeOutcome, redirect_target: &str) -> Option<String> {
    match outcome {
        ProbeOutcome::Reachable {
            fqdn,
            status,
            final_url,
        } => Some(format!(
            "[OK]            {} -> Status: {}, Final URL: {}",
            fqdn, status, final_url
        )),
        ProbeOutcome::Redirected { fqdn } => Some(format!(
            "[REDIRECT]      {} -> Redirected to {}",
            fqdn, redirect_target
        )),
        ProbeOutcome::Unreachable { .. } => None,
    }
}

/// Progress display and per-probe output for an interactive run
pub struct ConsoleReporter {
    bar: ProgressBar,
    redirect_target: String,
    echo: bool,
    interactive: bool,
}

impl ConsoleReporter {
    /// `echo` controls whether per-probe lines go to stdout
    pub fn new(total: usize, redirect_target: &str, echo: bool) -> Self {
        let interactive = std::io::stderr().is_terminal();
        let bar = if interactive {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::default_bar()
                .template("Checking domains {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}<{eta_precise}] {msg}")
                .map(|s| s.progress_chars("##-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            redirect_target: redirect_target.to_string(),
            echo,
            interactive,
        }
    }

    /// Remove the progress bar once the run is over
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProbeObserver for ConsoleReporter {
    fn on_start(&self, fqdn: &str) {
        self.bar.set_message(format!("Current: {}", fqdn));
    }

    fn on_outcome(&self, outcome: &ProbeOutcome, done: usize, total: usize) {
        self.bar.set_position(done as u64);

        if !self.interactive {
            tracing::debug!(done, total, fqdn = %outcome.fqdn(), "Progress");
        }

        if self.echo {
            if let Some(line) = outcome_line(outcome, &self.redirect_target) {
                // suspend() prints even when the bar is hidden, unlike println()
                self.bar.suspend(|| println!("\n{}", line));
            }
        }
    }
}

/// Human readable summary: header, reachable names, then a stats line
pub fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![SUMMARY_HEADER.to_string()];
    lines.extend(report.reachable.iter().cloned());

    let mut stats = format!(
        "Checked {} of {}: {} reachable, {} redirected, {} unreachable in {:.2}s",
        report.checked(),
        report.total,
        report.reachable.len(),
        report.redirected_count,
        report.unreachable.len(),
        report.elapsed().num_milliseconds() as f64 / 1000.0,
    );
    if report.checked() > 0 {
        stats.push_str(&format!(" (avg {:.1}ms per probe", report.avg_probe_ms));
        if let Some((fqdn, ms)) = &report.slowest {
            stats.push_str(&format!(", slowest {} at {}ms", fqdn, ms));
        }
        stats.push(')');
    }
    lines.push(String::new());
    lines.push(stats);
    lines
}

pub fn print_summary(report: &RunReport) {
    println!();
    for line in summary_lines(report) {
        println!("{}", line);
    }
}

/// Print the report as pretty JSON on stdout
pub fn print_json(report: &RunReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_lines() {
        let ok = ProbeOutcome::Reachable {
            fqdn: "x.example.com".to_string(),
            status: 200,
            final_url: "https://x.example.com/".to_string(),
        };
        assert_eq!(
            outcome_line(&ok, "").unwrap(),
            "[OK]            x.example.com -> Status: 200, Final URL: https://x.example.com/"
        );

        let parked = ProbeOutcome::Redirected {
            fqdn: "y.example.com".to_string(),
        };
        assert_eq!(
            outcome_line(&parked, "https://signup.example.com/").unwrap(),
            "[REDIRECT]      y.example.com -> Redirected to https://signup.example.com/"
        );

        let down = ProbeOutcome::Unreachable {
            fqdn: "z.example.com".to_string(),
            error: "timed out".to_string(),
        };
        assert!(outcome_line(&down, "").is_none());
    }

    #[test]
    fn test_summary_lists_only_reachable() {
        let mut report = RunReport::new("example.com", 3);
        report.reachable.push("a.example.com".to_string());
        report.unreachable.push("b.example.com".to_string());
        report.redirected_count = 1;

        let lines = summary_lines(&report);
        assert_eq!(lines[0], SUMMARY_HEADER);
        assert_eq!(lines[1], "a.example.com");
        assert!(!lines.iter().any(|l| l == "b.example.com"));
        assert!(lines.last().unwrap().contains("1 reachable, 1 redirected, 1 unreachable"));
    }

    #[test]
    fn test_summary_empty_run() {
        let report = RunReport::new("example.com", 0);
        let lines = summary_lines(&report);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("Checked 0 of 0"));
    }
}
