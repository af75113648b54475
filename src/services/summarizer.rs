//! Content summarizer — text and/or image → headline + Markdown summary.
//!
//! DESIGN
//! ======
//! One remote attempt per call, no retries. The provider is asked for a
//! schema-constrained JSON object, but the reply is still treated as
//! untrusted text: code fences are stripped, the first balanced JSON object
//! is located anywhere in the reply, and each missing field is replaced by
//! its own fallback rather than failing the call.
//!
//! ERROR HANDLING
//! ==============
//! Provider errors collapse into four operator-facing classes: unavailable
//! (no credential), auth (401/403), transport (network, timeout, any other
//! status) and malformed (nothing decodable in the reply).

use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ErrorCode;
use crate::image::ImagePayload;
use crate::llm::LlmChat;
use crate::llm::config::env_parse;
use crate::llm::schema::{SUMMARY_SCHEMA_NAME, summary_schema};
use crate::llm::types::{LlmError, StructuredRequest};
use crate::state::SummaryResult;

pub const FALLBACK_SHORT_SUMMARY: &str = "Update Received";
pub const FALLBACK_DETAILED_SUMMARY: &str = "No detailed summary provided.";

const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 1024;

const SYSTEM_INSTRUCTION: &str = "\
You are the summarization node of a campus notice dashboard.
Return a JSON object with:
1. \"detailedSummary\": a Markdown analysis of the submitted content.
2. \"shortSummary\": a one-sentence headline followed by one emoji.";

fn summary_max_tokens() -> u32 {
    static VALUE: OnceLock<u32> = OnceLock::new();
    *VALUE.get_or_init(|| env_parse("SUMMARY_MAX_TOKENS", DEFAULT_SUMMARY_MAX_TOKENS))
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("AI summarization unavailable: no credential configured")]
    AiUnavailable,
    #[error("AI service rejected the credential (status {status})")]
    AiAuthError { status: u16 },
    #[error("AI service unreachable: {0}")]
    AiTransportError(String),
    #[error("AI reply malformed: {0}")]
    AiMalformedResponse(String),
}

impl ErrorCode for SummarizeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AiUnavailable => "E_AI_UNAVAILABLE",
            Self::AiAuthError { .. } => "E_AI_AUTH",
            Self::AiTransportError(_) => "E_AI_TRANSPORT",
            Self::AiMalformedResponse(_) => "E_AI_MALFORMED_RESPONSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::AiTransportError(_))
    }
}

impl From<LlmError> for SummarizeError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::ConfigParse(_) | LlmError::MissingApiKey { .. } | LlmError::MalformedApiKey { .. } => {
                Self::AiUnavailable
            }
            LlmError::ApiResponse { status: status @ (401 | 403), .. } => Self::AiAuthError { status },
            LlmError::ApiResponse { status, body } => {
                Self::AiTransportError(format!("status {status}: {}", truncate(&body, 200)))
            }
            LlmError::ApiRequest(msg) | LlmError::HttpClientBuild(msg) => Self::AiTransportError(msg),
            LlmError::ApiParse(msg) => Self::AiMalformedResponse(msg),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// =============================================================================
// SUMMARIZER
// =============================================================================

/// Produces a [`SummaryResult`] through the configured LLM.
#[derive(Clone)]
pub struct ContentSummarizer {
    llm: Option<Arc<dyn LlmChat>>,
    max_tokens: u32,
}

impl ContentSummarizer {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self { llm, max_tokens: summary_max_tokens() }
    }

    /// Summarize text and/or an image. The caller guarantees at least one is
    /// present.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizeError::AiUnavailable`] without any network call when
    /// no LLM is configured; otherwise the mapped provider or parse error.
    pub async fn summarize(
        &self,
        text: Option<&str>,
        image: Option<&ImagePayload>,
    ) -> Result<SummaryResult, SummarizeError> {
        let Some(llm) = &self.llm else {
            return Err(SummarizeError::AiUnavailable);
        };

        let schema = summary_schema();
        let request = StructuredRequest {
            system: SYSTEM_INSTRUCTION,
            text,
            image,
            schema_name: SUMMARY_SCHEMA_NAME,
            schema: &schema,
            max_tokens: self.max_tokens,
        };

        info!(
            text_len = text.map_or(0, str::len),
            has_image = image.is_some(),
            "summarizer: request"
        );
        let reply = llm.generate(&request).await.map_err(|e| {
            warn!(error = %e, "summarizer: provider call failed");
            SummarizeError::from(e)
        })?;
        info!(reply_len = reply.len(), "summarizer: reply received");

        parse_summary(&reply)
    }
}

// =============================================================================
// REPLY PARSING
// =============================================================================

/// Decode a raw model reply into a [`SummaryResult`].
///
/// # Errors
///
/// Returns [`SummarizeError::AiMalformedResponse`] if no JSON object can be
/// decoded from the reply.
pub fn parse_summary(raw: &str) -> Result<SummaryResult, SummarizeError> {
    let unfenced = strip_code_fences(raw);
    let Some(object) = first_json_object(unfenced) else {
        return Err(SummarizeError::AiMalformedResponse(format!(
            "no JSON object in reply: {}",
            truncate(raw.trim(), 80)
        )));
    };

    Ok(SummaryResult {
        short_summary: field_or_fallback(&object, "shortSummary", FALLBACK_SHORT_SUMMARY),
        detailed_summary: field_or_fallback(&object, "detailedSummary", FALLBACK_DETAILED_SUMMARY),
    })
}

fn field_or_fallback(object: &serde_json::Map<String, Value>, key: &str, fallback: &str) -> String {
    match object.get(key).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => {
            debug!(field = key, "summarizer: field missing, using fallback");
            fallback.to_string()
        }
    }
}

/// Remove a surrounding Markdown code fence and its info string.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// First balanced `{...}` span that decodes as a JSON object. Spans that do
/// not decode are skipped whole.
fn first_json_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        let Some(end) = balanced_end(&text[start..]) else {
            search_from = start + 1;
            continue;
        };
        if let Ok(Value::Object(map)) = serde_json::from_str(&text[start..start + end]) {
            return Some(map);
        }
        // Skip the whole span so nothing nested in a broken object is returned.
        search_from = start + end;
    }
    None
}

/// Byte length of the balanced object starting at `text[0] == '{'`, honoring
/// string literals and escapes.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "summarizer_test.rs"]
mod tests;
