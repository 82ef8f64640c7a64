//! Error taxonomy shared by the store, the backends, and the relay.
//!
//! None of these are retried internally; each one fails the current
//! request and is surfaced to the caller.

use thiserror::Error;

/// Result alias used across the llmbridge crates.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown backend key or a backend entry missing a required field.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider call failed: transport error, non-success status, or a
    /// response body without the expected fields.
    #[error("upstream error from backend '{backend}': {message}")]
    Upstream { backend: String, message: String },

    /// The backend does not implement an optional capability.
    #[error("backend '{backend}' does not support {operation}")]
    UnsupportedOperation {
        backend: String,
        operation: &'static str,
    },

    /// The sender is not on the configured allowlist.
    #[error("sender '{0}' is not allowed")]
    SenderNotAllowed(String),

    /// A role string that is not `system`, `user` or `assistant`.
    #[error("invalid message role '{0}'")]
    InvalidRole(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn upstream(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Upstream {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(backend: impl Into<String>, operation: &'static str) -> Self {
        Error::UnsupportedOperation {
            backend: backend.into(),
            operation,
        }
    }
}
