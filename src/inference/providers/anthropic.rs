//! Anthropic provider using the Messages API.
//!
//! One request per invocation, no streaming: the relay replies with a
//! single envelope, so there is nothing to gain from SSE here.

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::inference::provider::api_error;
use crate::inference::{CompletionProvider, ProviderError, Sampling};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-opus-20240229";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ============================================================================
// Messages API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<InputMessage<'a>>,
}

/// One block of the `content` array. Only `text` blocks carry reply text.
#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

/// Joins every text block of the reply.
fn response_text(response: MessagesResponse) -> Result<String, ProviderError> {
    let texts: Vec<String> = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .map(|block| block.text)
        .collect();
    if texts.is_empty() {
        return Err(ProviderError::Parse(
            "Anthropic reply contained no text blocks".to_string(),
        ));
    }
    Ok(texts.concat())
}

// ============================================================================
// Provider Implementation
// ============================================================================

pub struct AnthropicProvider {
    api_key: String,
    model: String,
    base_url: String,
    sampling: Sampling,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key (an empty key fails at call time, not here)
    /// * `model` - Model identifier
    /// * `base_url` - Optional custom base URL (defaults to Anthropic's API)
    pub fn new(api_key: String, model: String, base_url: Option<String>, sampling: Sampling) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url
                .as_deref()
                .unwrap_or(DEFAULT_ANTHROPIC_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            sampling,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
            messages: vec![InputMessage {
                role: "user",
                content: prompt,
            }],
        };

        info!(
            "Anthropic request: model={}, prompt_len={}",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Anthropic response status: {}", response.status());

        if !response.status().is_success() {
            return Err(api_error("Anthropic", response).await);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        response_text(body)
    }
}
