//! Fuzzing session and endpoint orchestration
//!
//! A session owns the run result: every `fuzz_endpoint` call appends its
//! outcomes to the same append-only list until the caller starts a new
//! session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::info;

use crate::corpus;
use crate::dispatch::Dispatcher;
use crate::report::{self, FuzzReport, RunSummary};
use crate::results::{Payload, TestOutcome};

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct FuzzerConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Pause between dispatches in milliseconds. Keeps the request rate
    /// bounded so the target is not overwhelmed.
    pub delay_ms: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            delay_ms: 100,
            user_agent: concat!("skewer/", env!("CARGO_PKG_VERSION")).to_string(),
            follow_redirects: true,
        }
    }
}

/// One fuzzing session against a target API.
pub struct FuzzSession {
    base_url: String,
    config: FuzzerConfig,
    dispatcher: Dispatcher,
    results: Arc<RwLock<Vec<TestOutcome>>>,
    stopped: Arc<AtomicBool>,
}

impl FuzzSession {
    /// Create a session for the given base URL.
    pub fn new(base_url: &str, config: FuzzerConfig) -> Result<Self> {
        let dispatcher = Dispatcher::new(&config.user_agent, config.follow_redirects)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
            dispatcher,
            results: Arc::new(RwLock::new(Vec::new())),
            stopped: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Fuzz one endpoint: the fixed corpus first as `malformed_<i>`, then
    /// `count` random payloads as `random_<i>`.
    ///
    /// A custom payload list replaces the fixed corpus entirely; it is not
    /// merged with it. Never fails: every dispatch outcome, including
    /// transport failures, is captured, appended to the session run and
    /// returned.
    pub async fn fuzz_endpoint(
        &self,
        endpoint: &str,
        method: &str,
        count: usize,
        custom_payloads: Option<Vec<Payload>>,
    ) -> Vec<TestOutcome> {
        let url = format!("{}{}", self.base_url, endpoint);
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let corpus = custom_payloads.unwrap_or_else(corpus::build_corpus);

        info!(
            method,
            %url,
            corpus = corpus.len(),
            random = count,
            "starting fuzzing run"
        );

        let mut outcomes = Vec::with_capacity(corpus.len() + count);

        for (idx, payload) in corpus.iter().enumerate() {
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            let test_id = format!("malformed_{idx}");
            outcomes.push(
                self.dispatch_one(&url, method, payload, &test_id, timeout)
                    .await,
            );
        }

        for idx in 0..count {
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            let payload = corpus::build_random_payload();
            let test_id = format!("random_{idx}");
            outcomes.push(
                self.dispatch_one(&url, method, &payload, &test_id, timeout)
                    .await,
            );
        }

        info!(outcomes = outcomes.len(), "fuzzing run finished");

        self.results.write().extend(outcomes.iter().cloned());
        outcomes
    }

    async fn dispatch_one(
        &self,
        url: &str,
        method: &str,
        payload: &Payload,
        test_id: &str,
        timeout: Duration,
    ) -> TestOutcome {
        let outcome = self
            .dispatcher
            .send(url, method, payload, test_id, timeout)
            .await;

        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        outcome
    }

    /// Stop issuing new requests. The in-flight request, if any, resolves
    /// normally into the result set.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether the session has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Snapshot of every outcome accumulated so far.
    pub fn results(&self) -> Vec<TestOutcome> {
        self.results.read().clone()
    }

    /// Summary over all outcomes accumulated so far.
    pub fn summary(&self) -> RunSummary {
        report::summarize(&self.results.read())
    }

    /// Exportable report: the full result list plus its summary.
    pub fn export(&self) -> FuzzReport {
        let results = self.results();
        let summary = report::summarize(&results);
        FuzzReport { results, summary }
    }
}
