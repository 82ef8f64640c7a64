//! Anthropic Messages API adapter (`POST /v1/messages`).
//!
//! Differs from the OpenAI protocol in three ways that matter here: the
//! system prompt is a top-level field rather than a message, the reply is a
//! list of content blocks, and `max_tokens` is mandatory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use llmbridge_core::config::AnthropicConfig;
use llmbridge_core::{ChatMessage, CompletionResult, Error, Result, Role};

use crate::traits::Backend;
use crate::transport::{join_url, read_json};

/// Public API root used when the config does not name one.
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    messages: Vec<&'a ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    role: Option<String>,
    content: Option<Vec<ContentBlock>>,
    stop_reason: Option<String>,
    model: Option<String>,
}

/// Only text blocks carry reply text; other block types are ignored.
#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Adapter for the Anthropic Messages API.
pub struct AnthropicBackend {
    key: String,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_tokens: u32,
    default_model: Option<String>,
    default_system_prompt: Option<String>,
}

impl std::fmt::Debug for AnthropicBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // api_key is never printed
        f.debug_struct("AnthropicBackend")
            .field("key", &self.key)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl AnthropicBackend {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(key: impl Into<String>, config: &AnthropicConfig, client: reqwest::Client) -> Result<Self> {
        let key = key.into();
        if config.api_key.trim().is_empty() {
            return Err(Error::configuration(format!("backend '{key}' has no apiKey")));
        }

        Ok(Self {
            key,
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string()),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            default_model: config.default_model.clone(),
            default_system_prompt: config.default_system_prompt.clone(),
        })
    }

    fn parse_reply(&self, body: MessagesResponse) -> Result<CompletionResult> {
        let blocks = body
            .content
            .ok_or_else(|| Error::upstream(&self.key, "response has no content"))?;
        let finish_reason = body
            .stop_reason
            .ok_or_else(|| Error::upstream(&self.key, "response has no stop_reason"))?;
        let role = match body.role {
            Some(role) => role
                .parse()
                .map_err(|_| Error::upstream(&self.key, format!("unexpected role '{role}'")))?,
            None => Role::Assistant,
        };

        let text = blocks
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(CompletionResult::new(
            ChatMessage::new(role, text),
            finish_reason,
            body.model,
        ))
    }
}

#[async_trait]
impl Backend for AnthropicBackend {
    fn key(&self) -> &str {
        &self.key
    }

    fn display_name(&self) -> &str {
        "Anthropic"
    }

    fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    fn default_system_prompt(&self) -> Option<&str> {
        self.default_system_prompt.as_deref()
    }

    async fn create_chat_completion(
        &self,
        transcript: &[ChatMessage],
        system: Option<&str>,
        model: Option<&str>,
    ) -> Result<CompletionResult> {
        // The Messages API only accepts user/assistant turns.
        let messages: Vec<&ChatMessage> = transcript
            .iter()
            .filter(|m| {
                let keep = m.role != Role::System;
                if !keep {
                    debug!(backend = %self.key, "skipping system entry in transcript");
                }
                keep
            })
            .collect();

        let url = join_url(&self.base_url, "/v1/messages");
        debug!(
            backend = %self.key,
            model = model.unwrap_or("(none)"),
            messages = messages.len(),
            has_system = system.is_some(),
            "Calling Anthropic messages"
        );

        let request = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&MessagesRequest {
                messages,
                system,
                model,
                max_tokens: self.max_tokens,
            });
        let body: MessagesResponse = read_json(&self.key, request.send().await).await?;

        let result = self.parse_reply(body)?;
        debug!(
            backend = %self.key,
            stop_reason = %result.finish_reason,
            "Completion received"
        );
        Ok(result)
    }
}
