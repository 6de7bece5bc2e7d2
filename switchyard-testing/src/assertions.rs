// Test assertions for responses and dispatch results

use crate::TestResponse;
use serde_json::Value;
use switchyard_core::{Error, HttpResponse, HttpStatus, MvcContext};

/// Assert that a response has a specific status code
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status();
    assert_eq!(actual, expected, "Expected status {}, got {}", expected, actual);
}

pub fn assert_http_status(response: &HttpResponse, expected: HttpStatus) {
    assert_eq!(
        response.status,
        expected.code(),
        "Expected status {}, got {}",
        expected.code(),
        response.status
    );
}

/// Assert that no route matched the request
pub fn assert_not_matched(response: &TestResponse) {
    assert!(
        !response.is_matched(),
        "Expected no route to match, got {:?}",
        response
    );
}

/// Assert that a response body deserializes to `expected`
pub fn assert_json<T>(response: &TestResponse, expected: &T)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    match response.body_json::<T>() {
        Ok(actual) => assert_eq!(actual, *expected, "JSON bodies do not match"),
        Err(e) => panic!("Failed to deserialize response body: {}", e),
    }
}

pub fn assert_header(response: &TestResponse, key: &str, expected: &str) {
    let actual = response.header(key).map(|s| s.as_str());
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        key,
        expected,
        actual
    );
}

pub fn assert_body_contains(response: &TestResponse, expected: &str) {
    let body = response.body_string().unwrap_or_default();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}', but it didn't. Body: {}",
        expected,
        body
    );
}

/// Assert that a response is successful (2xx status)
pub fn assert_success(response: &TestResponse) {
    let status = response.status();
    assert!(
        (200..300).contains(&status),
        "Expected successful status (2xx), got {}",
        status
    );
}

/// Assert that a response is a client error (4xx status)
pub fn assert_client_error(response: &TestResponse) {
    let status = response.status();
    assert!(
        (400..500).contains(&status),
        "Expected client error status (4xx), got {}",
        status
    );
}

/// Assert that a response is a server error (5xx status)
pub fn assert_server_error(response: &TestResponse) {
    let status = response.status();
    assert!(
        (500..600).contains(&status),
        "Expected server error status (5xx), got {}",
        status
    );
}

/// Assert that a dispatch failed with the given status
pub fn assert_dispatch_error<T: std::fmt::Debug>(result: &Result<T, Error>, expected: u16) {
    match result {
        Err(error) => assert_eq!(
            error.status_code(),
            expected,
            "Expected dispatch error {}, got {}",
            expected,
            error
        ),
        Ok(value) => panic!("Expected dispatch error {}, got {:?}", expected, value),
    }
}

pub fn assert_view(ctx: &MvcContext, expected: impl Into<Value>) {
    let expected = expected.into();
    assert_eq!(ctx.view(), Some(&expected), "Unexpected view");
}

pub fn assert_exit_code(ctx: &MvcContext, expected: u16) {
    assert_eq!(
        ctx.exit_code(),
        expected,
        "Expected exit code {}, got {}",
        expected,
        ctx.exit_code()
    );
}

/// Assert that tolerated input validation flagged `field`
pub fn assert_validation_failed(ctx: &MvcContext, field: &str) {
    let fields: Vec<&str> = ctx
        .validation_errors()
        .iter()
        .map(|e| e.field.as_str())
        .collect();
    assert!(
        fields.contains(&field),
        "Expected a validation error for '{}', got {:?}",
        field,
        fields
    );
}
