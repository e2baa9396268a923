//! # Relay Server
//!
//! The axum layer. Owns the listening socket and maps transport events onto
//! [`RelayState::process`], which is where the relay's behavior lives.
//!
//! ```text
//! GET  /        WebSocket upgrade → ws::handle_socket (one task per connection)
//! POST /api/ai  {prompt, provider?} → {response, provider} | {error}
//! ```
//!
//! Connections share nothing mutable: the invoker holds read-only provider
//! settings and an optional semaphore.

mod http;
mod ws;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use log::{info, warn};
use tokio::net::TcpListener;

use crate::core::config::ResolvedConfig;
use crate::core::{Invoker, MessagePolicy, ResultEnvelope};

pub use http::{PromptReply, PromptRequest};

#[derive(Clone)]
pub struct RelayState {
    invoker: Arc<Invoker>,
    policy: MessagePolicy,
    http_prefix: Option<char>,
}

impl RelayState {
    pub fn new(invoker: Invoker, policy: MessagePolicy, http_prefix: Option<char>) -> Self {
        Self {
            invoker: Arc::new(invoker),
            policy,
            http_prefix,
        }
    }

    /// Wires the invoker to the resolved provider settings.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let invoker = Invoker::new(Arc::new(config.providers.clone()), config.timeout)
            .with_default_provider(config.provider)
            .with_concurrency_limit(config.max_concurrent_invocations);
        Self::new(
            invoker,
            MessagePolicy::new(config.require_prefix),
            config.http_prefix,
        )
    }

    /// Handles one relay message. Always yields exactly one envelope.
    pub async fn process(&self, text: &str) -> ResultEnvelope {
        if let Err(violation) = self.policy.check(text) {
            warn!("Rejected message: {}", violation);
            return ResultEnvelope::failure(violation);
        }
        self.invoker.invoke(text).await
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(ws::ws_handler))
        .route("/api/ai", post(http::prompt_handler))
        .with_state(state)
}

/// Serves until the listener fails.
pub async fn serve(listener: TcpListener, state: RelayState) -> std::io::Result<()> {
    serve_with_shutdown(listener, state, std::future::pending()).await
}

/// Serves until `shutdown` resolves, then stops accepting connections.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: RelayState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("WebSocket relay running on ws://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
