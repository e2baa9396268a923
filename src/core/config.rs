//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.avatar-relay/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The process environment is read exactly once, into an [`EnvSnapshot`].
//! [`resolve`] is a pure function of the file, the snapshot and the CLI
//! overrides, so provider resolution can be tested without touching
//! `std::env`.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ProviderKind;
use crate::inference::{ProviderSettings, Sampling};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelaySection,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub anthropic: HostedProviderConfig,
    #[serde(default)]
    pub xai: HostedProviderConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub max_concurrent_invocations: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RelaySection {
    /// Pins the relay to one provider instead of credential detection.
    pub provider: Option<String>,
    /// Sentinel the WebSocket relay requires. Unset or "" = accept all.
    pub require_prefix: Option<String>,
    /// Sentinel the HTTP prompt endpoint requires. "" disables it.
    pub http_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HostedProviderConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OllamaConfig {
    pub host: Option<String>,
    pub model: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HTTP_PREFIX: char = '>';

// ============================================================================
// Environment Snapshot
// ============================================================================

/// Environment variables captured once at startup.
///
/// Blank values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            vars: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Parses a variable, warning (and ignoring it) when malformed.
    fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring {}={:?}: not a valid value", key, raw);
                None
            }
        }
    }
}

// ============================================================================
// CLI Overrides
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub provider: Option<ProviderKind>,
    pub require_prefix: Option<char>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Resolved Config (concrete values)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub max_concurrent_invocations: Option<usize>,
    pub provider: Option<ProviderKind>,
    pub require_prefix: Option<char>,
    pub http_prefix: Option<char>,
    pub providers: ProviderSettings,
}

impl ResolvedConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.avatar-relay/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".avatar-relay").join("config.toml"))
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RelayConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(RelayConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RelayConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# avatar-relay configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# host = "0.0.0.0"                  # Or RELAY_HOST
# port = 3001                       # Or RELAY_PORT
# timeout_secs = 60                 # Upper bound on one upstream call
# max_concurrent_invocations = 8    # Across all connections; unset = unlimited

# [relay]
# provider = "anthropic"            # "anthropic", "xai" or "ollama"; unset = detect
# require_prefix = ">"              # WebSocket relay only answers ">..." messages
# http_prefix = ">"                 # POST /api/ai guard; "" disables it

# [generation]
# temperature = 0.7
# max_tokens = 1024

# [anthropic]
# api_key = "sk-ant-..."            # Or ANTHROPIC_API_KEY
# model = "claude-3-opus-20240229"  # Or ANTHROPIC_MODEL
# base_url = "https://api.anthropic.com/v1"

# [xai]
# api_key = "xai-..."               # Or XAI_API_KEY
# model = "grok-beta"               # Or XAI_MODEL
# base_url = "https://api.x.ai/v1"

# [ollama]
# host = "http://localhost:11434"   # Or OLLAMA_HOST
# model = "llama3"                  # Or OLLAMA_MODEL
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First character of a configured prefix; `""` means disabled.
fn prefix_char(value: &str) -> Option<char> {
    value.trim().chars().next()
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RelayConfig, env: &EnvSnapshot, cli: &CliOverrides) -> ResolvedConfig {
    // Host / port: CLI → env → config → default
    let host = cli
        .host
        .clone()
        .or_else(|| env.get("RELAY_HOST"))
        .or_else(|| non_empty(&config.server.host))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = cli
        .port
        .or_else(|| env.parse("RELAY_PORT"))
        .or(config.server.port)
        .unwrap_or(DEFAULT_PORT);

    let timeout_secs = cli
        .timeout_secs
        .or_else(|| env.parse("RELAY_TIMEOUT_SECS"))
        .or(config.server.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    // Pinned provider: CLI → env → config. Unknown names are dropped with a warning
    // so detection still works.
    let provider = cli.provider.or_else(|| {
        env.get("RELAY_PROVIDER")
            .or_else(|| non_empty(&config.relay.provider))
            .and_then(|name| {
                let kind = ProviderKind::from_selector(&name);
                if kind.is_none() {
                    warn!("Ignoring unknown provider {:?}", name);
                }
                kind
            })
    });

    let require_prefix = cli.require_prefix.or_else(|| {
        config
            .relay
            .require_prefix
            .as_deref()
            .and_then(prefix_char)
    });
    let http_prefix = match config.relay.http_prefix.as_deref() {
        Some(value) => prefix_char(value),
        None => Some(DEFAULT_HTTP_PREFIX),
    };

    let sampling = Sampling {
        temperature: config
            .generation
            .temperature
            .unwrap_or(Sampling::default().temperature),
        max_tokens: config
            .generation
            .max_tokens
            .unwrap_or(Sampling::default().max_tokens),
    };

    // Provider credentials and models: env → config
    let providers = ProviderSettings {
        anthropic_api_key: env
            .get("ANTHROPIC_API_KEY")
            .or_else(|| non_empty(&config.anthropic.api_key)),
        anthropic_model: env
            .get("ANTHROPIC_MODEL")
            .or_else(|| non_empty(&config.anthropic.model)),
        anthropic_base_url: env
            .get("ANTHROPIC_BASE_URL")
            .or_else(|| non_empty(&config.anthropic.base_url)),
        xai_api_key: env
            .get("XAI_API_KEY")
            .or_else(|| non_empty(&config.xai.api_key)),
        xai_model: env
            .get("XAI_MODEL")
            .or_else(|| non_empty(&config.xai.model)),
        xai_base_url: env
            .get("XAI_BASE_URL")
            .or_else(|| non_empty(&config.xai.base_url)),
        ollama_host: env
            .get("OLLAMA_HOST")
            .or_else(|| non_empty(&config.ollama.host)),
        ollama_model: env
            .get("OLLAMA_MODEL")
            .or_else(|| non_empty(&config.ollama.model)),
        sampling,
    };

    let resolved = ResolvedConfig {
        host,
        port,
        timeout: Duration::from_secs(timeout_secs),
        max_concurrent_invocations: config.server.max_concurrent_invocations,
        provider,
        require_prefix,
        http_prefix,
        providers,
    };
    debug!(
        "Resolved config: addr={}, provider={:?}, require_prefix={:?}",
        resolved.bind_addr(),
        resolved.provider,
        resolved.require_prefix
    );
    resolved
}
