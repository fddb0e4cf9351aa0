//! Fuzzing outcome records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::IssueTag;

/// One structured input sent as a request's query parameters or body.
///
/// No schema is enforced; payloads intentionally violate whatever implicit
/// schema the target expects.
pub type Payload = serde_json::Map<String, Value>;

/// Recorded result of dispatching one payload.
///
/// Exactly one of `status_code` and `error` is set: a received response
/// always carries a status code, a transport failure always carries an
/// error description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Unique id within a run: `malformed_<i>` for corpus entries,
    /// `random_<i>` for generated ones, or caller-supplied.
    pub test_id: String,

    /// Instant the request was issued.
    pub timestamp: DateTime<Utc>,

    /// Full request URL.
    pub url: String,

    /// HTTP method as given by the caller.
    pub method: String,

    /// Payload that was sent.
    pub payload: Payload,

    /// Status code of the received response; absent on transport failure.
    pub status_code: Option<u16>,

    /// Elapsed wall-clock seconds, recorded even on failure.
    pub response_time: f64,

    /// Failure description; absent when a response was received.
    pub error: Option<String>,

    /// Decoded JSON body, or a string holding a bounded raw snippet.
    pub response_body: Option<Value>,

    /// Anomaly tags attached by the dispatcher and classifier.
    pub issues: Vec<IssueTag>,
}

impl TestOutcome {
    /// Whether any anomaly was flagged on this outcome.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Whether this outcome belongs on the triage shortlist.
    pub fn is_critical(&self) -> bool {
        self.issues.iter().any(IssueTag::is_critical)
    }

    /// Stringified payload, as the validation-bypass rule sees it.
    pub fn payload_text(&self) -> String {
        Value::Object(self.payload.clone()).to_string()
    }
}
