//! End-to-end fuzzing runs against a local mock target.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skewer::{corpus, FuzzReport, FuzzSession, FuzzerConfig, IssueTag, Payload, RunSummary};

fn fast_config() -> FuzzerConfig {
    FuzzerConfig {
        delay_ms: 0,
        timeout_secs: 5,
        ..FuzzerConfig::default()
    }
}

fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap()
}

/// Base URL of an address nothing listens on.
fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn run_produces_stable_ids_in_corpus_then_random_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let session = FuzzSession::new(&server.uri(), fast_config()).unwrap();
    let outcomes = session.fuzz_endpoint("/x", "POST", 3, None).await;

    let corpus_len = corpus::build_corpus().len();
    assert_eq!(outcomes.len(), corpus_len + 3);
    for (i, outcome) in outcomes.iter().take(corpus_len).enumerate() {
        assert_eq!(outcome.test_id, format!("malformed_{i}"));
    }
    for (i, outcome) in outcomes.iter().skip(corpus_len).enumerate() {
        assert_eq!(outcome.test_id, format!("random_{i}"));
    }
}

#[tokio::test]
async fn accepting_target_flags_exactly_the_suspicious_corpus_entries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let session = FuzzSession::new(&server.uri(), fast_config()).unwrap();
    let outcomes = session.fuzz_endpoint("/x", "POST", 0, None).await;

    for outcome in &outcomes {
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.error, None);
    }

    let suspicious = ["<script>", "or 1=1", "drop table", "../"];
    let expected_bypass_ids: Vec<&str> = outcomes
        .iter()
        .filter(|o| {
            let text = o.payload_text().to_lowercase();
            suspicious.iter().any(|marker| text.contains(marker))
        })
        .map(|o| o.test_id.as_str())
        .collect();
    assert!(!expected_bypass_ids.is_empty());

    for outcome in &outcomes {
        let expected = expected_bypass_ids.contains(&outcome.test_id.as_str());
        assert_eq!(
            outcome.issues.contains(&IssueTag::ValidationBypass),
            expected,
            "unexpected tagging for {}",
            outcome.test_id
        );
    }

    let RunSummary::Completed(stats) = session.summary() else {
        panic!("expected a completed summary");
    };
    let critical_ids: Vec<&str> = stats
        .critical_findings
        .iter()
        .map(|o| o.test_id.as_str())
        .collect();
    assert_eq!(critical_ids, expected_bypass_ids);
}

#[tokio::test]
async fn get_requests_carry_the_payload_as_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/q"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let session = FuzzSession::new(&server.uri(), fast_config()).unwrap();
    let outcomes = session.fuzz_endpoint("/q", "GET", 0, None).await;

    // Every corpus entry, nested structures included, must survive query
    // encoding and come back as a received response.
    for outcome in &outcomes {
        assert_eq!(outcome.status_code, Some(204), "{} failed", outcome.test_id);
        assert_eq!(outcome.error, None);
    }
}

#[tokio::test]
async fn unreachable_target_yields_connection_errors_everywhere() {
    let session = FuzzSession::new(&unreachable_url(), fast_config()).unwrap();
    let outcomes = session.fuzz_endpoint("/x", "POST", 2, None).await;

    assert_eq!(outcomes.len(), corpus::build_corpus().len() + 2);
    for outcome in &outcomes {
        assert_eq!(outcome.error.as_deref(), Some("Connection error"));
        assert_eq!(outcome.issues, vec![IssueTag::ConnectionError]);
        assert!(outcome.status_code.is_none());
        assert!(outcome.response_time >= 0.0);
    }

    let RunSummary::Completed(stats) = session.summary() else {
        panic!("expected a completed summary");
    };
    assert_eq!(stats.errors, stats.total_tests);
    assert_eq!(stats.status_codes.get("null"), Some(&stats.total_tests));
}

#[tokio::test]
async fn slow_target_is_captured_as_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = FuzzerConfig {
        delay_ms: 0,
        timeout_secs: 1,
        ..FuzzerConfig::default()
    };
    let session = FuzzSession::new(&server.uri(), config).unwrap();
    let custom = vec![payload(json!({"probe": 1}))];
    let outcomes = session.fuzz_endpoint("/slow", "POST", 0, Some(custom)).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].error.as_deref(), Some("Request timeout"));
    assert_eq!(outcomes[0].issues, vec![IssueTag::Timeout]);
    assert!(outcomes[0].response_time >= 0.9);
    assert!(outcomes[0].status_code.is_none());
}

#[tokio::test]
async fn custom_payloads_replace_the_fixed_corpus() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let session = FuzzSession::new(&server.uri(), fast_config()).unwrap();
    let custom = vec![
        payload(json!({"a": 1})),
        payload(json!({"b": 2})),
    ];
    let outcomes = session.fuzz_endpoint("/x", "POST", 1, Some(custom)).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].test_id, "malformed_0");
    assert_eq!(outcomes[1].test_id, "malformed_1");
    assert_eq!(outcomes[2].test_id, "random_0");
    assert_eq!(outcomes[0].payload, payload(json!({"a": 1})));
}

#[tokio::test]
async fn server_errors_and_disclosure_bodies_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(503).set_body_string("stack trace: at handler line 42"),
        )
        .mount(&server)
        .await;

    let session = FuzzSession::new(&server.uri(), fast_config()).unwrap();
    let custom = vec![payload(json!({"name": "ok"}))];
    let outcomes = session
        .fuzz_endpoint("/broken", "POST", 0, Some(custom))
        .await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status_code, Some(503));
    assert!(outcomes[0].issues.contains(&IssueTag::ServerError));
    assert!(outcomes[0]
        .issues
        .contains(&IssueTag::InfoDisclosure("STACK_TRACE".to_string())));

    // Undecodable body falls back to the raw snippet.
    assert_eq!(
        outcomes[0].response_body,
        Some(Value::String("stack trace: at handler line 42".to_string()))
    );
}

#[tokio::test]
async fn outcomes_accumulate_across_endpoint_runs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let session = FuzzSession::new(&server.uri(), fast_config()).unwrap();
    let custom = vec![payload(json!({"a": 1}))];
    session
        .fuzz_endpoint("/one", "POST", 0, Some(custom.clone()))
        .await;
    session.fuzz_endpoint("/two", "POST", 2, Some(custom)).await;

    assert_eq!(session.results().len(), 4);
    let RunSummary::Completed(stats) = session.summary() else {
        panic!("expected a completed summary");
    };
    assert_eq!(stats.total_tests, 4);
}

#[tokio::test]
async fn stopped_session_issues_no_requests() {
    let session = FuzzSession::new(&unreachable_url(), fast_config()).unwrap();
    session.stop();

    let outcomes = session.fuzz_endpoint("/x", "POST", 5, None).await;
    assert!(outcomes.is_empty());
    assert_eq!(session.summary(), RunSummary::NoTestsRun);
}

#[tokio::test]
async fn export_matches_the_report_contract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let session = FuzzSession::new(&server.uri(), fast_config()).unwrap();
    let custom = vec![payload(json!({"a": 1}))];
    session.fuzz_endpoint("/x", "POST", 0, Some(custom)).await;

    let report = session.export();
    let value = serde_json::to_value(&report).unwrap();

    assert!(value["results"].is_array());
    assert_eq!(value["results"].as_array().unwrap().len(), 1);
    assert_eq!(value["summary"]["status"], "completed");
    assert_eq!(value["summary"]["total_tests"], 1);
    assert_eq!(value["results"][0]["issues"][0], "SERVER_ERROR");

    // The persisted form round-trips.
    let back: FuzzReport = serde_json::from_value(value).unwrap();
    assert_eq!(back.results.len(), 1);
    assert_eq!(back.summary, report.summary);
}
