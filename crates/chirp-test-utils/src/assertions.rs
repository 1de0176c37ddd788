use serde_json::Value;

/// Assert the response has the expected success status and return the body.
pub fn assert_api_ok(status: u16, expected_status: u16, body: &Value) -> &Value {
    assert_eq!(
        status, expected_status,
        "Expected {expected_status}, got {status}: {body}"
    );
    body
}

/// Assert the response matches the expected error status and error name.
pub fn assert_api_error(status: u16, body: &Value, expected_status: u16, expected_error: &str) {
    assert_eq!(
        status, expected_status,
        "Expected status {expected_status}, got {status}: {body}"
    );
    let error = body.get("error").and_then(|e| e.as_str());
    assert_eq!(
        error,
        Some(expected_error),
        "Expected error '{expected_error}', got {body}"
    );
}

/// Assert a 422 response carries a message for `field`.
pub fn assert_field_error(status: u16, body: &Value, field: &str) {
    assert_api_error(status, body, 422, "ValidationFailed");
    let messages = body["fields"][field].as_array();
    assert!(
        messages.is_some_and(|m| !m.is_empty()),
        "Expected a validation message for '{field}', got {body}"
    );
}
