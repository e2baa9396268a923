pub mod provider;
pub mod providers;
pub mod resolver;

pub use provider::{CompletionProvider, ProviderError, Sampling};
pub use providers::{AnthropicProvider, OllamaProvider, XaiProvider};
pub use resolver::{ProviderFactory, ProviderSettings};
