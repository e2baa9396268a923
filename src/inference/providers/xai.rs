//! xAI provider using the OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::inference::provider::api_error;
use crate::inference::{CompletionProvider, ProviderError, Sampling};

pub const DEFAULT_XAI_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_XAI_MODEL: &str = "grok-beta";

// ============================================================================
// Chat Completions Types
// ============================================================================

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

fn first_choice_text(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::Parse("xAI reply contained no choices".to_string()))
}

// ============================================================================
// Provider Implementation
// ============================================================================

pub struct XaiProvider {
    api_key: String,
    model: String,
    base_url: String,
    sampling: Sampling,
    client: reqwest::Client,
}

impl XaiProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>, sampling: Sampling) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url
                .as_deref()
                .unwrap_or(DEFAULT_XAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            sampling,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for XaiProvider {
    fn name(&self) -> &str {
        "xai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
            stream: false,
        };

        info!("xAI request: model={}, prompt_len={}", self.model, prompt.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("xAI response status: {}", response.status());

        if !response.status().is_success() {
            return Err(api_error("xAI", response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        first_choice_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_disables_streaming() {
        let request = ChatRequest {
            model: "grok-beta",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.7,
            max_tokens: 1024,
            stream: false,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""stream":false"#));
        assert!(json.contains(r#""max_tokens":1024"#));
    }

    #[test]
    fn test_first_choice_text() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Grok says hi"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "Grok says hi");
    }

    #[test]
    fn test_empty_choices_is_parse_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_base_url_defaults_and_trailing_slash() {
        let provider = XaiProvider::new(
            "key".to_string(),
            DEFAULT_XAI_MODEL.to_string(),
            None,
            Sampling::default(),
        );
        assert_eq!(provider.base_url, DEFAULT_XAI_BASE_URL);

        let provider = XaiProvider::new(
            "key".to_string(),
            DEFAULT_XAI_MODEL.to_string(),
            Some("https://proxy.example/v1//".to_string()),
            Sampling::default(),
        );
        assert_eq!(provider.base_url, "https://proxy.example/v1");
    }
}
