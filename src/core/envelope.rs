//! # Result Envelope
//!
//! The single JSON object sent back for every inbound message:
//!
//! ```text
//! {"response": "<model reply>"}
//! {"error": "Failed to process message: <reason>"}
//! ```
//!
//! Exactly one key, never both. The enum's external tagging gives that
//! shape directly.

use std::fmt;

use log::error;
use serde::{Deserialize, Serialize};

pub const FAILURE_PREFIX: &str = "Failed to process message: ";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultEnvelope {
    Response(String),
    Error(String),
}

impl ResultEnvelope {
    /// Wraps any failure as `{"error": "Failed to process message: ..."}`.
    pub fn failure(reason: impl fmt::Display) -> Self {
        ResultEnvelope::Error(format!("{FAILURE_PREFIX}{reason}"))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultEnvelope::Error(_))
    }

    /// Serializes to the wire form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialize envelope: {}", e);
            format!(r#"{{"error":"{FAILURE_PREFIX}envelope serialization failed"}}"#)
        })
    }
}
