//! Probe loop and result aggregation

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;

use super::{HttpFetcher, ProbeObserver, Prober, ReqwestFetcher};
use crate::error::Result;
use crate::types::{fqdn, ProbeOutcome, RunConfig, RunReport};

/// Timing statistics shared by in-flight probes
#[derive(Debug, Default)]
pub struct ProbeMetrics {
    inner: Mutex<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    probes: u64,
    total: Duration,
    slowest: Option<(String, Duration)>,
}

/// Point-in-time copy of `ProbeMetrics`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub probes: u64,
    pub avg_probe_ms: f64,
    pub slowest: Option<(String, u64)>,
}

impl ProbeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, fqdn: &str, elapsed: Duration) {
        let mut inner = self.inner.lock();
        inner.probes += 1;
        inner.total += elapsed;
        let slower = inner.slowest.as_ref().map_or(true, |(_, d)| elapsed > *d);
        if slower {
            inner.slowest = Some((fqdn.to_string(), elapsed));
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock();
        let avg_probe_ms = if inner.probes > 0 {
            inner.total.as_secs_f64() * 1000.0 / inner.probes as f64
        } else {
            0.0
        };
        MetricsSnapshot {
            probes: inner.probes,
            avg_probe_ms,
            slowest: inner
                .slowest
                .as_ref()
                .map(|(name, d)| (name.clone(), d.as_millis() as u64)),
        }
    }
}

/// Runs one probe per candidate and aggregates the outcomes
pub struct ProbeEngine<F> {
    prober: Prober<F>,
    concurrency: usize,
}

impl ProbeEngine<ReqwestFetcher> {
    /// Engine backed by a real HTTPS client
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let fetcher = ReqwestFetcher::new(config.timeout)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: HttpFetcher> ProbeEngine<F> {
    pub fn new(fetcher: F, config: &RunConfig) -> Self {
        Self {
            prober: Prober::new(fetcher, config),
            concurrency: config.concurrency.max(1),
        }
    }

    /// Probe every candidate exactly once, in ascending label order.
    ///
    /// With `concurrency > 1` up to that many probes are in flight, but
    /// outcomes are still consumed in label order, so the report lists
    /// keep the sequential ordering. Per-candidate failures never abort
    /// the run.
    pub async fn run(&self, candidates: &BTreeSet<String>, observer: &dyn ProbeObserver) -> RunReport {
        let total = candidates.len();
        let metrics = ProbeMetrics::new();
        let mut report = RunReport::new(self.prober.base_domain(), total);

        tracing::info!(
            base_domain = %self.prober.base_domain(),
            candidates = total,
            concurrency = self.concurrency,
            "Starting probe run"
        );

        let mut outcomes = stream::iter(candidates.iter())
            .map(|label| self.probe_one(label, observer, &metrics))
            .buffered(self.concurrency);

        let mut done = 0;
        while let Some(outcome) = outcomes.next().await {
            done += 1;
            report.record(&outcome);
            observer.on_outcome(&outcome, done, total);
        }

        let snapshot = metrics.snapshot();
        report.finished_at = Utc::now();
        report.avg_probe_ms = snapshot.avg_probe_ms;
        report.slowest = snapshot.slowest;

        tracing::info!(
            reachable = report.reachable.len(),
            unreachable = report.unreachable.len(),
            redirected = report.redirected_count,
            duration_ms = %report.elapsed().num_milliseconds(),
            "Probe run completed"
        );

        report
    }

    async fn probe_one(&self, label: &str, observer: &dyn ProbeObserver, metrics: &ProbeMetrics) -> ProbeOutcome {
        let name = fqdn(label, self.prober.base_domain());
        observer.on_start(&name);

        let start = Instant::now();
        let outcome = self.prober.probe(label).await;
        let elapsed = start.elapsed();
        metrics.record(&name, elapsed);

        match &outcome {
            ProbeOutcome::Unreachable { fqdn, error } => {
                tracing::debug!(fqdn = %fqdn, error = %error, duration_ms = %elapsed.as_millis(), "Unreachable");
            }
            ProbeOutcome::Redirected { fqdn } => {
                tracing::debug!(fqdn = %fqdn, duration_ms = %elapsed.as_millis(), "Redirected to parked target");
            }
            ProbeOutcome::Reachable { fqdn, status, .. } => {
                tracing::debug!(fqdn = %fqdn, status = status, duration_ms = %elapsed.as_millis(), "Reachable");
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubprobeError;
    use crate::probe::{FetchResponse, NullObserver};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers 200 for hosts whose first label starts with "ok", fails otherwise
    struct PrefixFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: Mutex<Vec<String>>,
    }

    impl PrefixFetcher {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpFetcher for PrefixFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse> {
            self.calls.lock().push(url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if url.starts_with("https://ok") {
                Ok(FetchResponse {
                    status: 200,
                    final_url: url.to_string(),
                })
            } else {
                Err(SubprobeError::network("connection refused", Some(url.to_string())))
            }
        }
    }

    fn labels(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config(concurrency: usize) -> RunConfig {
        RunConfig {
            base_domain: "example.com".to_string(),
            concurrency,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sequential_run_probes_in_order() {
        let engine = ProbeEngine::new(PrefixFetcher::new(), &config(1));
        let report = engine.run(&labels(&["okb", "x", "oka"]), &NullObserver).await;

        assert_eq!(report.reachable, vec!["oka.example.com", "okb.example.com"]);
        assert_eq!(report.unreachable, vec!["x.example.com"]);
        assert_eq!(report.checked(), 3);

        let fetcher = engine.prober.fetcher();
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 1);
        assert_eq!(
            *fetcher.calls.lock(),
            vec![
                "https://oka.example.com/",
                "https://okb.example.com/",
                "https://x.example.com/"
            ]
        );
    }

    #[tokio::test]
    async fn test_parallel_run_keeps_label_order() {
        let candidates = labels(&["ok1", "bad1", "ok2", "bad2", "ok3", "bad3"]);
        let engine = ProbeEngine::new(PrefixFetcher::new(), &config(4));
        let report = engine.run(&candidates, &NullObserver).await;

        assert_eq!(
            report.reachable,
            vec!["ok1.example.com", "ok2.example.com", "ok3.example.com"]
        );
        assert_eq!(
            report.unreachable,
            vec!["bad1.example.com", "bad2.example.com", "bad3.example.com"]
        );

        let peak = engine.prober.fetcher().peak.load(Ordering::SeqCst);
        assert!(peak > 1 && peak <= 4, "peak {}", peak);
    }

    #[tokio::test]
    async fn test_all_unreachable_still_completes() {
        let engine = ProbeEngine::new(PrefixFetcher::new(), &config(1));
        let report = engine.run(&labels(&["a", "b", "c"]), &NullObserver).await;

        assert!(report.reachable.is_empty());
        assert_eq!(report.unreachable.len(), 3);
        assert_eq!(report.total, 3);
    }

    #[tokio::test]
    async fn test_observer_sees_every_candidate() {
        struct Counting {
            started: Mutex<Vec<String>>,
            finished: AtomicUsize,
        }

        impl ProbeObserver for Counting {
            fn on_start(&self, fqdn: &str) {
                self.started.lock().push(fqdn.to_string());
            }

            fn on_outcome(&self, _outcome: &ProbeOutcome, done: usize, total: usize) {
                assert!(done <= total);
                self.finished.fetch_add(1, Ordering::SeqCst);
            }
        }

        let observer = Counting {
            started: Mutex::new(Vec::new()),
            finished: AtomicUsize::new(0),
        };
        let engine = ProbeEngine::new(PrefixFetcher::new(), &config(1));
        engine.run(&labels(&["", "ok"]), &observer).await;

        assert_eq!(*observer.started.lock(), vec!["example.com", "ok.example.com"]);
        assert_eq!(observer.finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = ProbeMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());

        metrics.record("a.example.com", Duration::from_millis(10));
        metrics.record("b.example.com", Duration::from_millis(30));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.probes, 2);
        assert!((snapshot.avg_probe_ms - 20.0).abs() < 1e-6);
        assert_eq!(snapshot.slowest, Some(("b.example.com".to_string(), 30)));
    }
}
