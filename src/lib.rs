//! avatar-relay library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod inference;
pub mod server;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Anthropic Messages API
    Anthropic,
    /// xAI chat completions
    Xai,
    /// Local Ollama runtime
    Ollama,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Xai => "xai",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Parses a selector such as `"Anthropic"` or `" ollama "`.
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Some(ProviderKind::Anthropic),
            "xai" => Some(ProviderKind::Xai),
            "ollama" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_selector_is_case_insensitive() {
        assert_eq!(ProviderKind::from_selector("Anthropic"), Some(ProviderKind::Anthropic));
        assert_eq!(ProviderKind::from_selector(" XAI "), Some(ProviderKind::Xai));
        assert_eq!(ProviderKind::from_selector("ollama"), Some(ProviderKind::Ollama));
        assert_eq!(ProviderKind::from_selector("openai"), None);
    }

    #[test]
    fn test_as_str_round_trips() {
        for kind in [ProviderKind::Anthropic, ProviderKind::Xai, ProviderKind::Ollama] {
            assert_eq!(ProviderKind::from_selector(kind.as_str()), Some(kind));
        }
    }
}
