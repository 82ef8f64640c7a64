//! Configuration schema: allowlist, default backend, and the backend table.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case. Snake-case
//! aliases are accepted for the fields so hand-written configs using the
//! `default_backend` / `base_url` spelling keep loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.llmbridge/config.json` + env vars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Which senders may talk to the bot. `false` disables the check.
    pub allowlist: Allowlist,
    /// Backend key used for rooms that have not picked one.
    #[serde(alias = "default_backend")]
    pub default_backend: String,
    /// Backend key → provider entry. Ordered by key.
    pub backends: BTreeMap<String, BackendConfig>,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut backends = BTreeMap::new();
        backends.insert(
            "openai".to_string(),
            BackendConfig::Openai(OpenAiConfig {
                default_model: Some("gpt-4o-mini".to_string()),
                ..Default::default()
            }),
        );

        Self {
            allowlist: Allowlist::Disabled,
            default_backend: "openai".to_string(),
            backends,
            database: DatabaseConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Look up a backend entry by key.
    pub fn backend(&self, key: &str) -> Result<&BackendConfig> {
        self.backends.get(key).ok_or_else(|| {
            Error::configuration(format!(
                "unknown backend '{}' (available: {})",
                key,
                self.backend_keys().join(", ")
            ))
        })
    }

    /// All configured backend keys, sorted.
    pub fn backend_keys(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// Check that the configuration can serve a message at all.
    pub fn validate(&self) -> Result<()> {
        if self.backends.is_empty() {
            return Err(Error::configuration("no backends configured"));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::configuration("http.timeoutSecs must be at least 1"));
        }
        self.backend(&self.default_backend).map(|_| ())
    }
}

// ─────────────────────────────────────────────
// Allowlist
// ─────────────────────────────────────────────

/// Sender allowlist.
///
/// On disk this is either `false` (everyone may talk to the bot) or a list
/// of sender ids. `true` is rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAllowlist", into = "RawAllowlist")]
pub enum Allowlist {
    #[default]
    Disabled,
    Senders(Vec<String>),
}

impl Allowlist {
    pub fn allows(&self, sender: &str) -> bool {
        match self {
            Allowlist::Disabled => true,
            Allowlist::Senders(senders) => senders.iter().any(|s| s == sender),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAllowlist {
    Flag(bool),
    Senders(Vec<String>),
}

impl TryFrom<RawAllowlist> for Allowlist {
    type Error = String;

    fn try_from(raw: RawAllowlist) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawAllowlist::Flag(false) => Ok(Allowlist::Disabled),
            RawAllowlist::Flag(true) => {
                Err("allowlist must be `false` or a list of sender ids".to_string())
            }
            RawAllowlist::Senders(senders) => Ok(Allowlist::Senders(senders)),
        }
    }
}

impl From<Allowlist> for RawAllowlist {
    fn from(allowlist: Allowlist) -> Self {
        match allowlist {
            Allowlist::Disabled => RawAllowlist::Flag(false),
            Allowlist::Senders(senders) => RawAllowlist::Senders(senders),
        }
    }
}

// ─────────────────────────────────────────────
// Backends
// ─────────────────────────────────────────────

/// One provider entry, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Any OpenAI-compatible server (llama.cpp, vLLM, Ollama, OpenRouter, …).
    BasicOpenai(BasicOpenAiConfig),
    /// api.openai.com with Bearer authentication.
    Openai(OpenAiConfig),
    /// Anthropic Messages API.
    Anthropic(AnthropicConfig),
}

impl BackendConfig {
    /// The `type` tag as written in the config file.
    pub fn type_name(&self) -> &'static str {
        match self {
            BackendConfig::BasicOpenai(_) => "basic_openai",
            BackendConfig::Openai(_) => "openai",
            BackendConfig::Anthropic(_) => "anthropic",
        }
    }

    pub fn default_model(&self) -> Option<&str> {
        match self {
            BackendConfig::BasicOpenai(c) => c.default_model.as_deref(),
            BackendConfig::Openai(c) => c.default_model.as_deref(),
            BackendConfig::Anthropic(c) => c.default_model.as_deref(),
        }
    }

    pub fn default_system_prompt(&self) -> Option<&str> {
        match self {
            BackendConfig::BasicOpenai(c) => c.default_system_prompt.as_deref(),
            BackendConfig::Openai(c) => c.default_system_prompt.as_deref(),
            BackendConfig::Anthropic(c) => c.default_system_prompt.as_deref(),
        }
    }

    /// Whether the entry has the credentials its provider requires.
    ///
    /// Generic OpenAI-compatible servers may run without authorization.
    pub fn is_configured(&self) -> bool {
        match self {
            BackendConfig::BasicOpenai(c) => !c.base_url.is_empty(),
            BackendConfig::Openai(c) => !c.api_key.is_empty(),
            BackendConfig::Anthropic(c) => !c.api_key.is_empty(),
        }
    }

    pub(crate) fn set_api_key(&mut self, key: String) {
        match self {
            // The generic adapter sends the header value verbatim.
            BackendConfig::BasicOpenai(c) => c.authorization = Some(key),
            BackendConfig::Openai(c) => c.api_key = key,
            BackendConfig::Anthropic(c) => c.api_key = key,
        }
    }

    pub(crate) fn set_base_url(&mut self, url: String) {
        match self {
            BackendConfig::BasicOpenai(c) => c.base_url = url,
            BackendConfig::Openai(c) => c.base_url = Some(url),
            BackendConfig::Anthropic(c) => c.base_url = Some(url),
        }
    }

    pub(crate) fn set_default_model(&mut self, model: String) {
        let slot = match self {
            BackendConfig::BasicOpenai(c) => &mut c.default_model,
            BackendConfig::Openai(c) => &mut c.default_model,
            BackendConfig::Anthropic(c) => &mut c.default_model,
        };
        *slot = Some(model);
    }
}

/// Generic OpenAI-compatible server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicOpenAiConfig {
    /// Server root, e.g. `http://localhost:8080`.
    #[serde(alias = "base_url")]
    pub base_url: String,
    /// Path segment between the root and `/chat/completions`.
    #[serde(default = "default_api_prefix", alias = "api_prefix")]
    pub api_prefix: String,
    /// Sent verbatim as the `Authorization` header when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    #[serde(default, alias = "default_model", skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, alias = "default_system_prompt", skip_serializing_if = "Option::is_none")]
    pub default_system_prompt: Option<String>,
}

/// OpenAI proper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    /// Defaults to `https://api.openai.com`.
    #[serde(default, alias = "base_url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, alias = "api_key")]
    pub api_key: String,
    #[serde(default, alias = "default_model", skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, alias = "default_system_prompt", skip_serializing_if = "Option::is_none")]
    pub default_system_prompt: Option<String>,
}

/// Anthropic Messages API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnthropicConfig {
    /// Defaults to `https://api.anthropic.com`.
    #[serde(default, alias = "base_url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, alias = "api_key")]
    pub api_key: String,
    /// Required by the Messages API on every request.
    #[serde(default = "default_max_tokens", alias = "max_tokens")]
    pub max_tokens: u32,
    #[serde(default, alias = "default_model", skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, alias = "default_system_prompt", skip_serializing_if = "Option::is_none")]
    pub default_system_prompt: Option<String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            default_model: None,
            default_system_prompt: None,
        }
    }
}

fn default_api_prefix() -> String {
    "/v1".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

// ─────────────────────────────────────────────
// Database / HTTP
// ─────────────────────────────────────────────

/// Where the room store lives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// SQLite URL. `~` is expanded. Defaults to `sqlite://~/.llmbridge/llmbridge.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DatabaseConfig {
    /// The effective database URL with `~` expanded.
    pub fn resolved_url(&self) -> String {
        match self.url.as_deref() {
            None => crate::utils::default_database_url(),
            Some(url) => match url.strip_prefix("sqlite://~") {
                Some(rest) => format!(
                    "sqlite://{}",
                    crate::utils::expand_home(&format!("~{rest}")).display()
                ),
                None => url.to_string(),
            },
        }
    }
}

/// Shared HTTP client settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    /// Per-request timeout for provider calls, in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
