pub mod anthropic;
pub mod ollama;
pub mod xai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use xai::XaiProvider;
