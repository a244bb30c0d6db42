//! Assertions for `application/problem+json` error responses.

use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Prefix of every `type` URI the backend emits.
pub const PROBLEM_TYPE_PREFIX: &str = "https://coinche.app/errors/";

#[derive(Debug, Deserialize)]
struct Problem {
    #[serde(rename = "type")]
    type_: String,
    title: String,
    status: u16,
    code: String,
    trace_id: String,
}

/// Check status, headers and body against the error contract and hand back
/// the parsed body for further assertions.
pub fn assert_problem_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_status: StatusCode,
    expected_code: &str,
) -> Value {
    assert_eq!(status, expected_status, "unexpected status");

    let content_type = headers
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "content-type should be application/problem+json (got {content_type})"
    );

    let trace_header = headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present");

    let json: Value = serde_json::from_slice(body).expect("problem body should be JSON");
    let problem: Problem =
        serde_json::from_value(json.clone()).expect("problem body should have every field");

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());
    assert_eq!(problem.trace_id, trace_header, "body trace_id should match header");
    assert_eq!(problem.type_, format!("{PROBLEM_TYPE_PREFIX}{expected_code}"));
    assert!(!problem.title.is_empty());
    json
}
