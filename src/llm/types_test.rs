use super::*;

// =============================================================================
// LlmError::error_code
// =============================================================================

#[test]
fn error_codes_are_distinct() {
    let errors = [
        LlmError::ConfigParse("bad".into()),
        LlmError::MissingApiKey { var: "KEY".into() },
        LlmError::MalformedApiKey { var: "KEY".into() },
        LlmError::ApiRequest("timeout".into()),
        LlmError::ApiResponse { status: 500, body: "oops".into() },
        LlmError::ApiParse("json".into()),
        LlmError::HttpClientBuild("tls".into()),
    ];
    let mut codes: Vec<&str> = errors.iter().map(ErrorCode::error_code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn error_code_missing_api_key() {
    let err = LlmError::MissingApiKey { var: "KEY".into() };
    assert_eq!(err.error_code(), "E_MISSING_API_KEY");
    assert_eq!(err.to_string(), "missing API key: env var KEY not set");
}

// =============================================================================
// LlmError::retryable
// =============================================================================

#[test]
fn retryable_api_request() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
}

#[test]
fn retryable_api_response_429_and_5xx() {
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
}

#[test]
fn not_retryable_auth_and_parse() {
    assert!(!LlmError::ApiResponse { status: 401, body: String::new() }.retryable());
    assert!(!LlmError::ApiParse("bad".into()).retryable());
    assert!(!LlmError::MissingApiKey { var: "KEY".into() }.retryable());
}
