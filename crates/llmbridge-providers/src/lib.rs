//! Backend layer for llmbridge.
//!
//! # Architecture
//!
//! - [`traits::Backend`]: the trait every provider adapter implements
//! - [`openai::OpenAiCompatBackend`]: any OpenAI-compatible `/chat/completions` server;
//!   the `openai` backend type is a config derivation feeding the same adapter
//! - [`anthropic::AnthropicBackend`]: the Anthropic Messages API
//! - [`factory::build_backend`]: builds a boxed backend from a config entry

pub mod anthropic;
pub mod factory;
pub mod openai;
pub mod traits;

mod transport;

pub use anthropic::AnthropicBackend;
pub use factory::{backend_for_key, build_backend, build_http_client};
pub use openai::{OpenAiCompatBackend, OpenAiCompatConfig};
pub use traits::Backend;
