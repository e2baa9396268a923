//! # Provider Resolution
//!
//! Picks a backend for one invocation and builds a fresh client for it.
//!
//! ```text
//! selector? ──yes──► that provider (never fails over)
//!     │
//!     no
//!     ▼
//! ANTHROPIC_API_KEY → XAI_API_KEY → OLLAMA_HOST   (first present wins)
//!     │
//!  none present
//!     ▼
//! ProviderError::Config
//! ```
//!
//! Resolution only reads the [`ProviderSettings`] it is handed. The process
//! environment is captured once at startup (see `core::config`), so nothing
//! here touches `std::env`.

use log::debug;

use crate::ProviderKind;
use crate::inference::providers::{anthropic, ollama, xai};
use crate::inference::{
    AnthropicProvider, CompletionProvider, OllamaProvider, ProviderError, Sampling, XaiProvider,
};

pub const NO_PROVIDER_MESSAGE: &str =
    "No valid provider configured. Please set ANTHROPIC_API_KEY, XAI_API_KEY, or OLLAMA_HOST.";

/// Credentials, endpoints and models for every backend.
///
/// Empty strings are normalized to `None` when the settings are built, so
/// `Some` always means "configured".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSettings {
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub anthropic_base_url: Option<String>,
    pub xai_api_key: Option<String>,
    pub xai_model: Option<String>,
    pub xai_base_url: Option<String>,
    pub ollama_host: Option<String>,
    pub ollama_model: Option<String>,
    pub sampling: Sampling,
}

impl ProviderSettings {
    /// Decides which backend serves a request.
    ///
    /// An explicit, non-blank selector always wins and must name a known
    /// provider. Otherwise the first configured backend in priority order is
    /// used.
    pub fn resolve_kind(&self, selector: Option<&str>) -> Result<ProviderKind, ProviderError> {
        if let Some(raw) = selector.map(str::trim).filter(|s| !s.is_empty()) {
            return ProviderKind::from_selector(raw).ok_or_else(|| {
                ProviderError::Config(format!(
                    "Unknown provider '{raw}'. Expected one of: anthropic, xai, ollama."
                ))
            });
        }

        if self.anthropic_api_key.is_some() {
            Ok(ProviderKind::Anthropic)
        } else if self.xai_api_key.is_some() {
            Ok(ProviderKind::Xai)
        } else if self.ollama_host.is_some() {
            Ok(ProviderKind::Ollama)
        } else {
            Err(ProviderError::Config(NO_PROVIDER_MESSAGE.to_string()))
        }
    }

    /// Builds a client for `kind`. Makes no network calls.
    pub fn build(&self, kind: ProviderKind) -> Box<dyn CompletionProvider> {
        match kind {
            ProviderKind::Anthropic => Box::new(AnthropicProvider::new(
                self.anthropic_api_key.clone().unwrap_or_default(),
                self.anthropic_model
                    .clone()
                    .unwrap_or_else(|| anthropic::DEFAULT_ANTHROPIC_MODEL.to_string()),
                self.anthropic_base_url.clone(),
                self.sampling,
            )),
            ProviderKind::Xai => Box::new(XaiProvider::new(
                self.xai_api_key.clone().unwrap_or_default(),
                self.xai_model
                    .clone()
                    .unwrap_or_else(|| xai::DEFAULT_XAI_MODEL.to_string()),
                self.xai_base_url.clone(),
                self.sampling,
            )),
            ProviderKind::Ollama => Box::new(OllamaProvider::new(
                self.ollama_host.clone(),
                self.ollama_model
                    .clone()
                    .unwrap_or_else(|| ollama::DEFAULT_OLLAMA_MODEL.to_string()),
                self.sampling,
            )),
        }
    }
}

/// Source of provider clients for the invocation layer.
///
/// The relay depends on this rather than on [`ProviderSettings`] directly so
/// tests can hand it scripted providers.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, selector: Option<&str>) -> Result<Box<dyn CompletionProvider>, ProviderError>;
}

impl ProviderFactory for ProviderSettings {
    fn create(&self, selector: Option<&str>) -> Result<Box<dyn CompletionProvider>, ProviderError> {
        let kind = self.resolve_kind(selector)?;
        let provider = self.build(kind);
        debug!(
            "Resolved provider {} (model={}) for selector {:?}",
            provider.name(),
            provider.model(),
            selector
        );
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_all() -> ProviderSettings {
        ProviderSettings {
            anthropic_api_key: Some("sk-ant".to_string()),
            xai_api_key: Some("xai-key".to_string()),
            ollama_host: Some("http://localhost:11434".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_configuration_fails_with_all_three_variables() {
        let err = ProviderSettings::default().resolve_kind(None).unwrap_err();
        assert_eq!(err, ProviderError::Config(NO_PROVIDER_MESSAGE.to_string()));
        let msg = err.to_string();
        assert!(msg.contains("ANTHROPIC_API_KEY"));
        assert!(msg.contains("XAI_API_KEY"));
        assert!(msg.contains("OLLAMA_HOST"));
    }

    #[test]
    fn test_anthropic_key_only_resolves_to_anthropic() {
        let settings = ProviderSettings {
            anthropic_api_key: Some("sk-ant".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_kind(None).unwrap(), ProviderKind::Anthropic);
    }

    #[test]
    fn test_priority_order_without_selector() {
        let mut settings = settings_with_all();
        assert_eq!(settings.resolve_kind(None).unwrap(), ProviderKind::Anthropic);

        settings.anthropic_api_key = None;
        assert_eq!(settings.resolve_kind(None).unwrap(), ProviderKind::Xai);

        settings.xai_api_key = None;
        assert_eq!(settings.resolve_kind(None).unwrap(), ProviderKind::Ollama);
    }

    #[test]
    fn test_empty_selector_is_treated_as_absent() {
        let settings = ProviderSettings {
            xai_api_key: Some("xai-key".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_kind(Some("")).unwrap(), ProviderKind::Xai);
        assert_eq!(settings.resolve_kind(Some("  ")).unwrap(), ProviderKind::Xai);
    }

    #[test]
    fn test_ollama_selector_without_environment_builds_ollama() {
        let settings = ProviderSettings::default();
        let provider = settings.create(Some("ollama")).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "llama3");
    }

    #[test]
    fn test_selector_wins_over_environment_priority() {
        let settings = settings_with_all();
        assert_eq!(settings.resolve_kind(Some("xai")).unwrap(), ProviderKind::Xai);
        assert_eq!(
            settings.resolve_kind(Some("ollama")).unwrap(),
            ProviderKind::Ollama
        );
    }

    #[test]
    fn test_unknown_selector_is_config_error() {
        let err = settings_with_all().resolve_kind(Some("gpt")).unwrap_err();
        assert!(matches!(err, ProviderError::Config(msg) if msg.contains("'gpt'")));
    }

    #[test]
    fn test_build_uses_default_models() {
        let settings = settings_with_all();
        assert_eq!(
            settings.build(ProviderKind::Anthropic).model(),
            "claude-3-opus-20240229"
        );
        assert_eq!(settings.build(ProviderKind::Xai).model(), "grok-beta");
    }

    #[test]
    fn test_build_uses_configured_models() {
        let settings = ProviderSettings {
            anthropic_api_key: Some("sk-ant".to_string()),
            anthropic_model: Some("claude-3-5-haiku-latest".to_string()),
            ..Default::default()
        };
        let provider = settings.create(None).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "claude-3-5-haiku-latest");
    }
}
