//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::time::Duration;

use async_trait::async_trait;

use crate::inference::{CompletionProvider, ProviderError, ProviderFactory};

/// Replies with `echo: <prompt>`.
pub struct EchoProvider;

#[async_trait]
impl CompletionProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-model"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("echo: {prompt}"))
    }
}

/// Always fails with the given error.
pub struct FailingProvider(pub ProviderError);

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "failing-model"
    }

    async fn invoke(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(self.0.clone())
    }
}

/// Sleeps, then echoes the prompt back unchanged.
pub struct SlowProvider {
    delay: Duration,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CompletionProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    fn model(&self) -> &str {
        "slow-model"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(prompt.to_string())
    }
}

type BuildFn = dyn Fn() -> Result<Box<dyn CompletionProvider>, ProviderError> + Send + Sync;

/// Factory that ignores the selector and builds whatever the closure returns.
pub struct FnFactory {
    build: Box<BuildFn>,
}

impl FnFactory {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> Result<Box<dyn CompletionProvider>, ProviderError> + Send + Sync + 'static,
    {
        Self {
            build: Box::new(build),
        }
    }
}

impl ProviderFactory for FnFactory {
    fn create(&self, _selector: Option<&str>) -> Result<Box<dyn CompletionProvider>, ProviderError> {
        (self.build)()
    }
}
