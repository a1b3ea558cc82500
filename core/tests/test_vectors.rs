//! Verify request building and response parsing against the JSON vectors in
//! `test-vectors/`.
//!
//! `build.json` pins the exact signed URL, method, content type and body for a
//! set of requests. `status.json` pins the outcome of parsing a status code
//! plus body; bodies given as JSON are gzipped before parsing, `raw_body`
//! strings are passed through untouched.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use keepa_core::{ApiError, ClientConfig, HttpMethod, HttpResponse, KeepaClient, Request, ResponseStatus};

const BASE_URL: &str = "http://localhost:3000";

fn client(access_key: &str) -> KeepaClient {
    KeepaClient::with_config(access_key, ClientConfig::default().with_base_url(BASE_URL))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn gzip(raw: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).unwrap();
    encoder.finish().unwrap()
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_test_vectors() {
    let raw = include_str!("../../test-vectors/build.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client(vectors["access_key"].as_str().unwrap());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];

        let mut request = Request::new(input["path"].as_str().unwrap());
        for (key, value) in input["parameters"].as_object().unwrap() {
            request = request.param(key.as_str(), value.as_str().unwrap());
        }
        if let Some(body) = input.get("post_data").and_then(|b| b.as_str()) {
            request = request.post_data(body);
        }

        let expected = &case["expected_request"];
        let req = c.build_request(&request);
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.header("content-type"), expected["content_type"].as_str(), "{name}: content type");
        assert_eq!(req.body.as_deref(), expected["body"].as_str(), "{name}: body");
        assert_eq!(req.header("accept-encoding"), Some("gzip"), "{name}: accept-encoding");
    }
}

// ---------------------------------------------------------------------------
// Status mapping
// ---------------------------------------------------------------------------

#[test]
fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client("abc123");
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = match case.get("body") {
            Some(json) => gzip(json.to_string().as_bytes()),
            None => case["raw_body"].as_str().unwrap().as_bytes().to_vec(),
        };
        let response = HttpResponse {
            status: case["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body,
        };

        let result = c.parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Decode" => assert!(matches!(err, ApiError::Decode(_)), "{name}: expected Decode"),
                "UnexpectedStatus" => assert!(
                    matches!(err, ApiError::UnexpectedStatus { .. }),
                    "{name}: expected UnexpectedStatus"
                ),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let parsed = result.unwrap();
            let expected: ResponseStatus =
                serde_json::from_value(case["expected_status"].clone()).unwrap();
            assert_eq!(parsed.status, expected, "{name}: status");
            assert_eq!(
                parsed.tokens_left,
                case["expected_tokens_left"].as_i64().unwrap(),
                "{name}: tokens left"
            );
        }
    }
}
