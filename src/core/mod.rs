//! # Core Relay Logic
//!
//! Everything the relay decides, independent of the transport.
//!
//! ```text
//!   raw text ──► policy ──► invoke ──► envelope ──► JSON frame
//!                  │           │
//!                  │           └── inference::ProviderFactory
//!                  └── rejected: error envelope, provider never called
//! ```
//!
//! ## Modules
//!
//! - [`config`]: defaults → config file → env vars → CLI
//! - [`envelope`]: the `{response}` / `{error}` reply
//! - [`invoke`]: one provider call under a timeout, folded into an envelope
//! - [`policy`]: which inbound messages are admitted
//! - [`chat`]: `display-name: message` chat lines

pub mod chat;
pub mod config;
pub mod envelope;
pub mod invoke;
pub mod policy;

pub use envelope::ResultEnvelope;
pub use invoke::{Completion, Invoker};
pub use policy::{MessagePolicy, PolicyViolation};
