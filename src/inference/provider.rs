use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// No provider could be resolved, or the selector was not recognized.
    Config(String),
    /// Network-level failure (DNS, connection refused, reset).
    Network(String),
    /// API returned an error response (bad key, rate limit, server error).
    Api { status: u16, message: String },
    /// Failed to parse the provider's response.
    Parse(String),
    /// The upstream call did not finish within the configured bound.
    Timeout(Duration),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Config messages are shown to chat clients verbatim.
            ProviderError::Config(msg) => write!(f, "{msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::Timeout(limit) => {
                write!(f, "upstream request timed out after {limit:?}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Generation knobs shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// A single-turn chat model bound to one backend.
///
/// Implementations are cheap to build and hold no connection state, so the
/// resolver constructs a fresh one for every invocation.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Returns the model identifier requests are sent with.
    fn model(&self) -> &str;

    /// Sends `prompt` as a single user turn and returns the reply text.
    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Reads a failed upstream response into `ProviderError::Api`.
pub(crate) async fn api_error(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    log::warn!("{} API error: {} - {}", provider, status, message);
    ProviderError::Api { status, message }
}
