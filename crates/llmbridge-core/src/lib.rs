//! llmbridge core: shared types, errors, configuration, the in-process
//! message bus, and the SQLite-backed room session store.
//!
//! Everything above this crate (providers, the relay, the CLI) speaks in
//! terms of [`types::ChatMessage`] and [`error::Error`].

pub mod bus;
pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use types::{ChatMessage, CompletionResult, Role};
