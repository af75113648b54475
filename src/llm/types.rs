//! LLM types — provider-neutral request shape and errors.
//!
//! Every provider receives the same [`StructuredRequest`]: a system
//! instruction, optional text, optional inline image, and a JSON schema the
//! reply must satisfy. Providers return the raw reply text; decoding it is
//! the summarizer's job.

use crate::error::ErrorCode;
use crate::image::ImagePayload;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The API key is present but blank or not a single token.
    #[error("malformed API key in env var {var}")]
    MalformedApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::MalformedApiKey { .. } => "E_MALFORMED_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// A single-turn request whose reply must be a JSON object matching `schema`.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    pub system: &'a str,
    pub text: Option<&'a str>,
    pub image: Option<&'a ImagePayload>,
    /// Name used where a provider requires one (tool name, schema name).
    pub schema_name: &'a str,
    pub schema: &'a serde_json::Value,
    pub max_tokens: u32,
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// Provider-neutral async trait for structured generation. Enables mocking in
/// tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send one request and return the model's raw reply text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the provider rejects it,
    /// or the provider envelope is malformed.
    async fn generate(&self, request: &StructuredRequest<'_>) -> Result<String, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
