//! Response classification rules
//!
//! Attaches zero or more issue tags to a completed outcome. The transport
//! failure tags (`TIMEOUT`, `CONNECTION_ERROR`, `EXCEPTION`) are assigned by
//! the dispatcher; the rules here only run when a response was received.
//! Classification is pure and order-independent except the single-match
//! short-circuit on the disclosure keywords.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::results::Payload;

/// Response time above this many seconds is flagged as slow.
pub const SLOW_RESPONSE_SECS: f64 = 5.0;

/// Response bodies longer than this many characters are flagged.
pub const LARGE_RESPONSE_CHARS: usize = 100_000;

/// Keywords that suggest internal details leaking into a response body.
const DISCLOSURE_KEYWORDS: [&str; 8] = [
    "exception",
    "stack trace",
    "error at line",
    "sql",
    "database",
    "query failed",
    "path",
    "file not found",
];

/// Payload fragments that should never be accepted with a 200.
const BYPASS_MARKERS: [&str; 4] = ["<script>", "or 1=1", "drop table", "../"];

/// Anomaly class attached to a test outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueTag {
    /// The caller-specified timeout elapsed.
    Timeout,
    /// DNS failure, refused or reset connection.
    ConnectionError,
    /// Any other dispatch failure, including invalid methods.
    Exception,
    /// Status code in the 5xx range.
    ServerError,
    /// Response slower than [`SLOW_RESPONSE_SECS`].
    SlowResponse,
    /// Disclosure keyword found in the body, upper-snake form
    /// (e.g. `STACK_TRACE`).
    InfoDisclosure(String),
    /// Body longer than [`LARGE_RESPONSE_CHARS`].
    LargeResponse,
    /// Suspicious payload accepted with a 200.
    ValidationBypass,
}

impl IssueTag {
    /// Report label for this tag.
    pub fn label(&self) -> String {
        match self {
            IssueTag::Timeout => "TIMEOUT".to_string(),
            IssueTag::ConnectionError => "CONNECTION_ERROR".to_string(),
            IssueTag::Exception => "EXCEPTION".to_string(),
            IssueTag::ServerError => "SERVER_ERROR".to_string(),
            IssueTag::SlowResponse => "SLOW_RESPONSE".to_string(),
            IssueTag::InfoDisclosure(keyword) => format!("INFO_DISCLOSURE_{keyword}"),
            IssueTag::LargeResponse => "LARGE_RESPONSE".to_string(),
            IssueTag::ValidationBypass => "POTENTIAL_VALIDATION_BYPASS".to_string(),
        }
    }

    /// Tags worth surfacing first during triage.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            IssueTag::ServerError | IssueTag::ValidationBypass | IssueTag::InfoDisclosure(_)
        )
    }
}

impl fmt::Display for IssueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for IssueTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for IssueTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        match label.as_str() {
            "TIMEOUT" => Ok(IssueTag::Timeout),
            "CONNECTION_ERROR" => Ok(IssueTag::ConnectionError),
            "EXCEPTION" => Ok(IssueTag::Exception),
            "SERVER_ERROR" => Ok(IssueTag::ServerError),
            "SLOW_RESPONSE" => Ok(IssueTag::SlowResponse),
            "LARGE_RESPONSE" => Ok(IssueTag::LargeResponse),
            "POTENTIAL_VALIDATION_BYPASS" => Ok(IssueTag::ValidationBypass),
            other => other
                .strip_prefix("INFO_DISCLOSURE_")
                .filter(|keyword| !keyword.is_empty())
                .map(|keyword| IssueTag::InfoDisclosure(keyword.to_string()))
                .ok_or_else(|| de::Error::custom(format!("unknown issue tag: {other}"))),
        }
    }
}

/// Classify a received response against the fixed rule set.
///
/// Rules are evaluated independently; a single response can collect several
/// tags. Only the first matching disclosure keyword is reported.
pub fn classify(status: u16, body: &str, elapsed_secs: f64, payload: &Payload) -> Vec<IssueTag> {
    let mut issues = Vec::new();

    if (500..600).contains(&status) {
        issues.push(IssueTag::ServerError);
    }

    if elapsed_secs > SLOW_RESPONSE_SECS {
        issues.push(IssueTag::SlowResponse);
    }

    let body_lower = body.to_lowercase();
    if let Some(keyword) = DISCLOSURE_KEYWORDS
        .into_iter()
        .find(|keyword| body_lower.contains(*keyword))
    {
        issues.push(IssueTag::InfoDisclosure(
            keyword.to_uppercase().replace(' ', "_"),
        ));
    }

    if body.chars().count() > LARGE_RESPONSE_CHARS {
        issues.push(IssueTag::LargeResponse);
    }

    if status == 200 {
        let payload_lower = Value::Object(payload.clone()).to_string().to_lowercase();
        if BYPASS_MARKERS
            .iter()
            .any(|marker| payload_lower.contains(*marker))
        {
            issues.push(IssueTag::ValidationBypass);
        }
    }

    issues
}
