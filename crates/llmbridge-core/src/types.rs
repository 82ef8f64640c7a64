//! Core types: the role-tagged chat message and the normalized completion result.
//!
//! Every backend adapter speaks its own wire dialect, but all of them accept a
//! transcript of [`ChatMessage`] and hand back a [`CompletionResult`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────

/// Who authored a transcript entry.
///
/// Serializes to the lowercase strings used by both the OpenAI and Anthropic
/// APIs and by the `context_entries.role` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// ChatMessage
// ─────────────────────────────────────────────

/// One entry of a room transcript.
///
/// Serialized as `{"role": "...", "content": "..."}`, which is exactly the
/// message shape both provider families accept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// ─────────────────────────────────────────────
// CompletionResult
// ─────────────────────────────────────────────

/// The normalized outcome of one backend invocation.
///
/// Only `message` outlives the call; it is appended to the transcript and
/// the rest is dropped once logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionResult {
    /// The generated reply, role and content as returned by the provider.
    pub message: ChatMessage,
    /// Why the model stopped generating (`"stop"`, `"end_turn"`, …).
    pub finish_reason: String,
    /// The model that produced the reply, when the provider reports it.
    pub model: Option<String>,
}

impl CompletionResult {
    pub fn new(message: ChatMessage, finish_reason: impl Into<String>, model: Option<String>) -> Self {
        CompletionResult {
            message,
            finish_reason: finish_reason.into(),
            model,
        }
    }
}
