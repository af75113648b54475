//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Structured output is obtained by
//! forcing a single tool whose `input_schema` is the requested schema; the
//! tool input is the reply. Pure parsing in `parse_response` for testability.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::LlmTimeouts;
use super::types::{LlmError, StructuredRequest};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
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
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let text = super::read_success_body(response).await?;
        parse_response(&text, request.schema_name)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [ApiMessage<'a>; 1],
    tools: [ApiTool<'a>; 1],
    tool_choice: ToolChoice<'a>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct ApiTool<'a> {
    name: &'a str,
    description: &'static str,
    input_schema: &'a Value,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'static str,
    name: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

fn build_request<'a>(model: &'a str, request: &StructuredRequest<'a>) -> ApiRequest<'a> {
    let mut content = Vec::new();
    // Image block precedes the text that refers to it.
    if let Some(image) = request.image {
        content.push(RequestBlock::Image {
            source: ImageSource { source_type: "base64", media_type: image.mime_type(), data: image.to_base64() },
        });
    }
    if let Some(text) = request.text {
        content.push(RequestBlock::Text { text: super::user_prompt(text) });
    }

    ApiRequest {
        model,
        max_tokens: request.max_tokens,
        system: request.system,
        messages: [ApiMessage { role: "user", content }],
        tools: [ApiTool {
            name: request.schema_name,
            description: "Publish the summary of the submitted content.",
            input_schema: request.schema,
        }],
        tool_choice: ToolChoice { choice_type: "tool", name: request.schema_name },
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str, tool_name: &str) -> Result<String, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let mut text = String::new();
    for block in api.content {
        match block {
            ResponseBlock::ToolUse { name, input } if name == tool_name => {
                return serde_json::to_string(&input).map_err(|e| LlmError::ApiParse(e.to_string()));
            }
            ResponseBlock::Text { text: t } => text.push_str(&t),
            ResponseBlock::ToolUse { .. } | ResponseBlock::Unknown => {}
        }
    }

    if text.is_empty() {
        return Err(LlmError::ApiParse(format!("anthropic: no {tool_name} tool call or text content")));
    }
    Ok(text)
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
