//! # Invocation
//!
//! Resolves a provider, calls it once, and turns the outcome into a
//! [`ResultEnvelope`]. Failures never escape as faults: they are logged and
//! returned as error envelopes.
//!
//! ```text
//! message ─► factory.create() ─► timeout([permit] ─► provider.invoke()) ─► envelope
//! ```
//!
//! No retries. One upstream failure is one error envelope.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use tokio::sync::Semaphore;

use crate::ProviderKind;
use crate::core::envelope::ResultEnvelope;
use crate::inference::{ProviderError, ProviderFactory};

pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(60);

/// A successful provider call, with the name of the backend that served it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub provider: String,
}

pub struct Invoker {
    factory: Arc<dyn ProviderFactory>,
    /// Provider pinned by server configuration. `None` = resolve from settings.
    default_provider: Option<ProviderKind>,
    timeout: Duration,
    /// Global cap on concurrent upstream calls across all connections.
    limiter: Option<Arc<Semaphore>>,
}

impl Invoker {
    pub fn new(factory: Arc<dyn ProviderFactory>, timeout: Duration) -> Self {
        Self {
            factory,
            default_provider: None,
            timeout,
            limiter: None,
        }
    }

    pub fn with_default_provider(mut self, provider: Option<ProviderKind>) -> Self {
        self.default_provider = provider;
        self
    }

    /// A limit of zero means unlimited.
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.limiter = limit
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    /// Calls a provider with `prompt`. An explicit `selector` wins over the
    /// configured default provider.
    pub async fn complete(
        &self,
        selector: Option<&str>,
        prompt: &str,
    ) -> Result<Completion, ProviderError> {
        let selector = selector
            .filter(|s| !s.trim().is_empty())
            .or(self.default_provider.map(ProviderKind::as_str));
        let provider = self.factory.create(selector)?;

        // The bound covers queueing for a permit as well as the call itself.
        let text = tokio::time::timeout(self.timeout, async {
            let _permit = match &self.limiter {
                Some(limiter) => Some(limiter.acquire().await.map_err(|e| {
                    ProviderError::Config(format!("invocation limiter closed: {e}"))
                })?),
                None => None,
            };

            debug!(
                "Invoking {} (model={}) with {} bytes",
                provider.name(),
                provider.model(),
                prompt.len()
            );
            provider.invoke(prompt).await
        })
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))??;

        Ok(Completion {
            text,
            provider: provider.name().to_string(),
        })
    }

    /// Relay entry point: never fails, always yields one envelope.
    pub async fn invoke(&self, message: &str) -> ResultEnvelope {
        match self.complete(None, message).await {
            Ok(completion) => ResultEnvelope::Response(completion.text),
            Err(e) => {
                error!("LLM invocation error: {}", e);
                ResultEnvelope::failure(e)
            }
        }
    }
}
