//! Ollama provider (local inference runtime) using the native `/api/chat` endpoint.

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::inference::provider::api_error;
use crate::inference::{CompletionProvider, ProviderError, Sampling};

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Ollama calls max output tokens `num_predict`.
#[derive(Serialize, Debug)]
struct Options {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Deserialize, Debug)]
struct ReplyMessage {
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    message: ReplyMessage,
}

/// Local Ollama runtime. No auth.
pub struct OllamaProvider {
    host: String,
    model: String,
    sampling: Sampling,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(host: Option<String>, model: String, sampling: Sampling) -> Self {
        let host = host.unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());
        Self {
            host: host.trim_end_matches('/').to_string(),
            model,
            sampling,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
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
            stream: false,
            options: Options {
                temperature: self.sampling.temperature,
                num_predict: self.sampling.max_tokens,
            },
        };

        info!(
            "Ollama request: host={}, model={}, prompt_len={}",
            self.host,
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Ollama response status: {}", response.status());

        if !response.status().is_success() {
            return Err(api_error("Ollama", response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(body.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_maps_max_tokens_to_num_predict() {
        let request = ChatRequest {
            model: "llama3",
            messages: vec![],
            stream: false,
            options: Options {
                temperature: 0.7,
                num_predict: 1024,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["options"]["num_predict"], 1024);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_host_defaults_and_trailing_slash() {
        let provider = OllamaProvider::new(None, "llama3".to_string(), Sampling::default());
        assert_eq!(provider.host, DEFAULT_OLLAMA_HOST);

        let provider = OllamaProvider::new(
            Some("http://gpu-box:11434/".to_string()),
            "llama3".to_string(),
            Sampling::default(),
        );
        assert_eq!(provider.host, "http://gpu-box:11434");
    }
}
