//! LLM — multi-provider adapter for content summarization.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to
//! Gemini, Anthropic or `OpenAI` based on `LLM_PROVIDER`. Every provider is
//! asked for a reply constrained by a JSON schema and hands back the raw
//! reply text through the [`LlmChat`] trait.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod openai;
pub mod schema;
pub mod types;

use std::time::Duration;

use config::{LlmConfig, LlmProviderKind, LlmTimeouts};
pub use types::LlmChat;
use types::{LlmError, StructuredRequest};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to the configured provider.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Gemini(gemini::GeminiClient),
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables. See
    /// [`LlmConfig::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let LlmConfig { provider, api_key, model, base_url, timeouts } = config;
        let inner = match provider {
            LlmProviderKind::Gemini => LlmProvider::Gemini(gemini::GeminiClient::new(api_key, base_url, timeouts)?),
            LlmProviderKind::Anthropic => {
                LlmProvider::Anthropic(anthropic::AnthropicClient::new(api_key, base_url, timeouts)?)
            }
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(api_key, base_url, timeouts)?),
        };
        Ok(Self { inner, model })
    }

    /// Return the configured model name (e.g. `"gemini-2.5-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        match &self.inner {
            LlmProvider::Gemini(_) => LlmProviderKind::Gemini.as_str(),
            LlmProvider::Anthropic(_) => LlmProviderKind::Anthropic.as_str(),
            LlmProvider::OpenAi(_) => LlmProviderKind::OpenAi.as_str(),
        }
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn generate(&self, request: &StructuredRequest<'_>) -> Result<String, LlmError> {
        match &self.inner {
            LlmProvider::Gemini(c) => c.generate(&self.model, request).await,
            LlmProvider::Anthropic(c) => c.generate(&self.model, request).await,
            LlmProvider::OpenAi(c) => c.generate(&self.model, request).await,
        }
    }
}

// =============================================================================
// SHARED HTTP PLUMBING
// =============================================================================

fn build_http(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

/// Read the body, turning any non-200 status into [`LlmError::ApiResponse`].
async fn read_success_body(response: reqwest::Response) -> Result<String, LlmError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

    if status != 200 {
        return Err(LlmError::ApiResponse { status, body: text });
    }
    Ok(text)
}

/// User-turn wording shared by every provider.
fn user_prompt(text: &str) -> String {
    format!("Analyze this: {text}")
}
