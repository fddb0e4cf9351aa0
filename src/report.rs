//! Run aggregation and report export
//!
//! `summarize` is a pure function over the ordered outcome list and is
//! recomputed on demand; nothing here keeps hidden counters.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::results::TestOutcome;

/// Summary of a fuzzing run.
///
/// An empty run is a distinct state, not a zero-filled summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunSummary {
    /// No outcomes recorded yet.
    NoTestsRun,
    /// Aggregates over at least one outcome.
    Completed(SummaryStats),
}

/// Aggregate statistics plus the triage shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of outcomes in the run.
    pub total_tests: usize,
    /// Outcomes that carry a transport error.
    pub errors: usize,
    /// Outcomes with at least one issue tag.
    pub tests_with_issues: usize,
    /// Mean response time in seconds.
    pub average_response_time: f64,
    /// Status code histogram; transport failures count under `"null"`,
    /// so the counts always sum to `total_tests`.
    pub status_codes: HashMap<String, usize>,
    /// Issue tag histogram keyed by report label.
    pub issues_found: HashMap<String, usize>,
    /// Outcomes whose issues intersect the critical tag set (server error,
    /// validation bypass, information disclosure), in original order.
    pub critical_findings: Vec<TestOutcome>,
}

/// Aggregate an ordered outcome list into a [`RunSummary`].
pub fn summarize(results: &[TestOutcome]) -> RunSummary {
    if results.is_empty() {
        return RunSummary::NoTestsRun;
    }

    let total_tests = results.len();
    let errors = results.iter().filter(|r| r.error.is_some()).count();
    let tests_with_issues = results.iter().filter(|r| r.has_issues()).count();

    let mut status_codes: HashMap<String, usize> = HashMap::new();
    let mut issues_found: HashMap<String, usize> = HashMap::new();
    for outcome in results {
        let key = outcome
            .status_code
            .map_or_else(|| "null".to_string(), |status| status.to_string());
        *status_codes.entry(key).or_insert(0) += 1;

        for tag in &outcome.issues {
            *issues_found.entry(tag.label()).or_insert(0) += 1;
        }
    }

    let average_response_time =
        results.iter().map(|r| r.response_time).sum::<f64>() / total_tests as f64;

    let critical_findings = results
        .iter()
        .filter(|r| r.is_critical())
        .cloned()
        .collect();

    RunSummary::Completed(SummaryStats {
        total_tests,
        errors,
        tests_with_issues,
        average_response_time,
        status_codes,
        issues_found,
        critical_findings,
    })
}

impl RunSummary {
    /// Log the summary block the CLI prints after a run.
    pub fn log(&self) {
        match self {
            RunSummary::NoTestsRun => info!("No tests run yet"),
            RunSummary::Completed(stats) => {
                info!("Total tests: {}", stats.total_tests);
                info!("Errors: {}", stats.errors);
                info!("Tests with issues: {}", stats.tests_with_issues);
                info!(
                    "Average response time: {:.3}s",
                    stats.average_response_time
                );
                info!(
                    status_codes = ?stats.status_codes,
                    issues_found = ?stats.issues_found,
                    critical = stats.critical_findings.len(),
                    "distributions"
                );
            }
        }
    }
}

/// Exported report: the structure a persisted-report reader must match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzReport {
    /// Every outcome of the session, in dispatch order.
    pub results: Vec<TestOutcome>,
    /// Summary over those outcomes.
    pub summary: RunSummary,
}

impl FuzzReport {
    /// Pretty-printed JSON form of the report.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }

    /// Persist the report to disk as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        info!(path = %path.display(), "results saved");
        Ok(())
    }
}
