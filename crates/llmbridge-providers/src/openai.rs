//! OpenAI-compatible chat completions adapter.
//!
//! One adapter serves both the `basic_openai` and the `openai` backend
//! types. The `openai` type is only a config derivation: it fills in the
//! public API root and turns the API key into a Bearer header, then hands
//! an [`OpenAiCompatConfig`] to the same [`OpenAiCompatBackend`].

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use llmbridge_core::config::{BasicOpenAiConfig, OpenAiConfig};
use llmbridge_core::{ChatMessage, CompletionResult, Error, Result, Role};

use crate::traits::Backend;
use crate::transport::{join_url, read_json};

/// Public API root used by the `openai` backend type.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

// ─────────────────────────────────────────────
// Resolved config
// ─────────────────────────────────────────────

/// Fully resolved settings for an OpenAI-compatible server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenAiCompatConfig {
    pub base_url: String,
    pub api_prefix: String,
    /// Sent verbatim as the `Authorization` header.
    pub authorization: Option<String>,
    pub default_model: Option<String>,
    pub default_system_prompt: Option<String>,
}

impl OpenAiCompatConfig {
    /// Settings for a generic server, taken as configured.
    pub fn from_basic(key: &str, config: &BasicOpenAiConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::configuration(format!(
                "backend '{key}' has no baseUrl"
            )));
        }

        Ok(Self {
            base_url: config.base_url.clone(),
            api_prefix: config.api_prefix.clone(),
            authorization: config.authorization.clone(),
            default_model: config.default_model.clone(),
            default_system_prompt: config.default_system_prompt.clone(),
        })
    }

    /// Settings for api.openai.com (or a configured replacement root).
    pub fn from_openai(key: &str, config: &OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::configuration(format!(
                "backend '{key}' has no apiKey"
            )));
        }

        Ok(Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            api_prefix: "/v1".to_string(),
            authorization: Some(format!("Bearer {}", config.api_key)),
            default_model: config.default_model.clone(),
            default_system_prompt: config.default_system_prompt.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        join_url(
            &self.base_url,
            &format!("{}{}", self.api_prefix.trim_end_matches('/'), path),
        )
    }

    /// `{base_url}{api_prefix}/chat/completions`
    pub fn completions_url(&self) -> String {
        self.endpoint("/chat/completions")
    }

    /// `{base_url}{api_prefix}/models`
    pub fn models_url(&self) -> String {
        self.endpoint("/models")
    }
}

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    role: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

// ─────────────────────────────────────────────
// OpenAiCompatBackend
// ─────────────────────────────────────────────

/// Adapter for any server speaking the OpenAI chat completions protocol.
pub struct OpenAiCompatBackend {
    key: String,
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl std::fmt::Debug for OpenAiCompatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatBackend")
            .field("key", &self.key)
            .field("base_url", &self.config.base_url)
            .field("api_prefix", &self.config.api_prefix)
            .field("default_model", &self.config.default_model)
            .finish()
    }
}

impl OpenAiCompatBackend {
    pub fn new(key: impl Into<String>, config: OpenAiCompatConfig, client: reqwest::Client) -> Self {
        Self {
            key: key.into(),
            client,
            config,
        }
    }

    pub fn config(&self) -> &OpenAiCompatConfig {
        &self.config
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.authorization {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    fn parse_completion(&self, body: ChatCompletionResponse) -> Result<CompletionResult> {
        let ChatCompletionResponse { choices, model } = body;
        let choice = choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream(&self.key, "response has no choices"))?;

        let message = choice
            .message
            .ok_or_else(|| Error::upstream(&self.key, "choice has no message"))?;
        let role = message
            .role
            .ok_or_else(|| Error::upstream(&self.key, "message has no role"))?;
        let role: Role = role
            .parse()
            .map_err(|_| Error::upstream(&self.key, format!("unexpected role '{role}'")))?;
        let content = message
            .content
            .ok_or_else(|| Error::upstream(&self.key, "message has no content"))?;
        let finish_reason = choice
            .finish_reason
            .ok_or_else(|| Error::upstream(&self.key, "choice has no finish_reason"))?;

        Ok(CompletionResult::new(
            ChatMessage::new(role, content),
            finish_reason,
            choice.model.or(model),
        ))
    }
}

#[async_trait]
impl Backend for OpenAiCompatBackend {
    fn key(&self) -> &str {
        &self.key
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }

    fn default_model(&self) -> Option<&str> {
        self.config.default_model.as_deref()
    }

    fn default_system_prompt(&self) -> Option<&str> {
        self.config.default_system_prompt.as_deref()
    }

    async fn create_chat_completion(
        &self,
        transcript: &[ChatMessage],
        system: Option<&str>,
        model: Option<&str>,
    ) -> Result<CompletionResult> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        if let Some(system) = system {
            messages.push(ChatMessage::system(system));
        }
        messages.extend_from_slice(transcript);

        let url = self.config.completions_url();
        debug!(
            backend = %self.key,
            url = %url,
            model = model.unwrap_or("(server default)"),
            messages = messages.len(),
            "Calling chat completions"
        );

        let request = self
            .with_auth(self.client.post(&url))
            .json(&ChatCompletionRequest { messages, model });
        let body: ChatCompletionResponse = read_json(&self.key, request.send().await).await?;

        let result = self.parse_completion(body)?;
        debug!(
            backend = %self.key,
            finish_reason = %result.finish_reason,
            model = result.model.as_deref().unwrap_or("?"),
            "Completion received"
        );
        Ok(result)
    }

    async fn fetch_models(&self) -> Result<Vec<String>> {
        let request = self.with_auth(self.client.get(self.config.models_url()));
        let list: ModelList = read_json(&self.key, request.send().await).await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
