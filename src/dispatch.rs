//! Request dispatch with uniform outcome capture
//!
//! The dispatcher never lets a failure escape: timeouts, connection errors,
//! unsupported methods and anything else the transport reports are folded
//! into the outcome record, so one bad payload or one unresponsive target
//! cannot abort a run.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify;
use crate::error::DispatchFailure;
use crate::results::{Payload, TestOutcome};

/// Longest raw-text snippet kept when a body does not decode as JSON.
pub const BODY_SNIPPET_CHARS: usize = 500;

/// Sends individual fuzz payloads and normalizes every outcome.
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    /// Create a dispatcher with its own HTTP client.
    pub fn new(user_agent: &str, follow_redirects: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(if follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Dispatch one payload and record everything about the exchange.
    ///
    /// Always returns an outcome: exactly one of `status_code` and `error`
    /// is set, and `response_time` covers the whole exchange, success or
    /// failure. GET and DELETE carry the payload as query parameters, the
    /// body-bearing methods send it as JSON.
    pub async fn send(
        &self,
        url: &str,
        method: &str,
        payload: &Payload,
        test_id: &str,
        timeout: Duration,
    ) -> TestOutcome {
        debug!(test_id, method, url, "dispatching payload");

        let mut outcome = TestOutcome {
            test_id: test_id.to_string(),
            timestamp: Utc::now(),
            url: url.to_string(),
            method: method.to_string(),
            payload: payload.clone(),
            status_code: None,
            response_time: 0.0,
            error: None,
            response_body: None,
            issues: Vec::new(),
        };

        let start = Instant::now();
        match self.execute(url, method, payload, timeout).await {
            Ok((status, body)) => {
                outcome.response_time = start.elapsed().as_secs_f64();
                outcome.status_code = Some(status);
                outcome.response_body = Some(decode_body(&body));
                outcome.issues = classify::classify(status, &body, outcome.response_time, payload);
            }
            Err(failure) => {
                outcome.response_time = start.elapsed().as_secs_f64();
                outcome.error = Some(failure.to_string());
                outcome.issues.push(failure.tag());
            }
        }

        if outcome.has_issues() {
            warn!(
                test_id,
                status = ?outcome.status_code,
                issues = ?outcome.issues,
                "issues found"
            );
        }

        outcome
    }

    async fn execute(
        &self,
        url: &str,
        method: &str,
        payload: &Payload,
        timeout: Duration,
    ) -> Result<(u16, String), DispatchFailure> {
        let builder = match method.to_uppercase().as_str() {
            "GET" => self.client.get(url).query(&query_pairs(payload)),
            "DELETE" => self.client.delete(url).query(&query_pairs(payload)),
            "POST" => self.client.post(url).json(payload),
            "PUT" => self.client.put(url).json(payload),
            "PATCH" => self.client.patch(url).json(payload),
            _ => return Err(DispatchFailure::InvalidMethod(method.to_string())),
        };

        let response = builder
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DispatchFailure::from_reqwest(&e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchFailure::from_reqwest(&e))?;

        Ok((status, body))
    }
}

/// Query form of a payload: strings as-is, other values in their compact
/// JSON form, so structured corpus entries survive a GET without erroring
/// the encoder.
fn query_pairs(payload: &Payload) -> Vec<(String, String)> {
    payload
        .iter()
        .map(|(key, value)| (key.clone(), query_text(value)))
        .collect()
}

fn query_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode-with-fallback: the parsed JSON body if it decodes, else a bounded
/// snippet of the raw text.
fn decode_body(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => Value::String(body.chars().take(BODY_SNIPPET_CHARS).collect()),
    }
}
