//! OpenAI-compatible `/chat/completions` client.
//!
//! Structured output via `response_format: json_schema` with `strict: true`.
//! Images travel as `data:` URLs in `image_url` content parts.

use serde::Serialize;
use serde_json::Value;

use super::config::LlmTimeouts;
use super::types::{LlmError, StructuredRequest};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = super::build_http(timeouts)?;
        Ok(Self { http, api_key, base_url })
    }

    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status, or an
    /// undecodable response envelope.
    pub async fn generate(&self, model: &str, request: &StructuredRequest<'_>) -> Result<String, LlmError> {
        let body = build_request(model, request);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let text = super::read_success_body(response).await?;
        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [CcMessage; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct CcMessage {
    role: &'static str,
    content: CcContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CcContent {
    Text(String),
    Parts(Vec<CcPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CcPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

fn build_request<'a>(model: &'a str, request: &StructuredRequest<'a>) -> CcRequest<'a> {
    let mut parts = Vec::new();
    if let Some(text) = request.text {
        parts.push(CcPart::Text { text: super::user_prompt(text) });
    }
    if let Some(image) = request.image {
        parts.push(CcPart::ImageUrl { image_url: ImageUrl { url: image.to_data_url() } });
    }

    CcRequest {
        model,
        max_tokens: request.max_tokens,
        messages: [
            CcMessage { role: "system", content: CcContent::Text(request.system.to_string()) },
            CcMessage { role: "user", content: CcContent::Parts(parts) },
        ],
        response_format: ResponseFormat {
            format_type: "json_schema",
            json_schema: JsonSchemaFormat { name: request.schema_name, strict: true, schema: request.schema },
        },
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_response(json_text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(message) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0].message".to_string()));
    };

    if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
        return Err(LlmError::ApiParse(format!("chat_completions: model refused: {refusal}")));
    }

    match message.get("content").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(LlmError::ApiParse("chat_completions: empty message content".to_string())),
    }
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
