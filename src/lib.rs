//! skewer - black-box API fuzzing and anomaly detection engine
//!
//! Sends a corpus of adversarial and randomized payloads against an HTTP
//! endpoint, classifies each response against a fixed issue taxonomy, and
//! aggregates the outcomes into a report that surfaces the findings most
//! likely to matter: server errors, information disclosure, validation
//! bypass. Findings are candidate anomalies for human triage, not confirmed
//! vulnerabilities.

pub mod classify;
pub mod corpus;
pub mod dispatch;
pub mod error;
pub mod report;
pub mod results;
pub mod session;

pub use classify::{classify, IssueTag};
pub use dispatch::Dispatcher;
pub use error::DispatchFailure;
pub use report::{summarize, FuzzReport, RunSummary, SummaryStats};
pub use results::{Payload, TestOutcome};
pub use session::{FuzzSession, FuzzerConfig};
