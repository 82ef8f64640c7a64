//! Backend construction from config entries.

use std::time::Duration;

use tracing::debug;

use llmbridge_core::config::{BackendConfig, Config, HttpConfig};
use llmbridge_core::{Error, Result};

use crate::anthropic::AnthropicBackend;
use crate::openai::{OpenAiCompatBackend, OpenAiCompatConfig};
use crate::traits::Backend;

/// Build the process-wide HTTP client shared by every backend.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))
}

/// Build the adapter for one backend entry.
///
/// Fails with [`Error::Configuration`] when the entry lacks a field its
/// provider requires.
pub fn build_backend(
    key: &str,
    config: &BackendConfig,
    client: reqwest::Client,
) -> Result<Box<dyn Backend>> {
    debug!(backend = key, kind = config.type_name(), "Creating backend");

    let backend: Box<dyn Backend> = match config {
        BackendConfig::BasicOpenai(c) => Box::new(OpenAiCompatBackend::new(
            key,
            OpenAiCompatConfig::from_basic(key, c)?,
            client,
        )),
        BackendConfig::Openai(c) => Box::new(OpenAiCompatBackend::new(
            key,
            OpenAiCompatConfig::from_openai(key, c)?,
            client,
        )),
        BackendConfig::Anthropic(c) => Box::new(AnthropicBackend::new(key, c, client)?),
    };
    Ok(backend)
}

/// Look up `key` in `config` and build its adapter.
pub fn backend_for_key(
    config: &Config,
    key: &str,
    client: reqwest::Client,
) -> Result<Box<dyn Backend>> {
    build_backend(key, config.backend(key)?, client)
}
