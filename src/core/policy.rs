//! # Message Policy
//!
//! Admission rules applied before a message reaches a provider. A rejected
//! message still gets exactly one error envelope back; nothing is dropped.
//!
//! - Empty or whitespace-only text is always rejected.
//! - `require_prefix` optionally restricts the relay to messages starting
//!   with a sentinel such as `>`. Off by default for the WebSocket relay,
//!   which accepts every chat line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    Empty,
    MissingPrefix(char),
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyViolation::Empty => write!(f, "Prompt is required"),
            PolicyViolation::MissingPrefix(c) => write!(f, "Message must start with '{c}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessagePolicy {
    pub require_prefix: Option<char>,
}

impl MessagePolicy {
    pub fn new(require_prefix: Option<char>) -> Self {
        Self { require_prefix }
    }

    pub fn check(&self, text: &str) -> Result<(), PolicyViolation> {
        if text.trim().is_empty() {
            return Err(PolicyViolation::Empty);
        }
        match self.require_prefix {
            Some(prefix) if !text.starts_with(prefix) => Err(PolicyViolation::MissingPrefix(prefix)),
            _ => Ok(()),
        }
    }
}
