//! `!llm` chat commands: parsing and reply rendering.

use std::fmt;

/// Reaction sent when a command changed room state.
pub const ACK_REACTION: &str = "✅";

const PREFIX: &str = "!llm";

pub const USAGE: &str = "Usage: !llm <info|backend <key>|model <name|->|system <prompt|->|clear>";

/// A parsed `!llm` subcommand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the room's effective configuration.
    Info,
    /// Switch the room to another backend key.
    Backend(String),
    /// Set the model override; `None` restores the backend default.
    Model(Option<String>),
    /// Set the system prompt override; `None` restores the backend default.
    System(Option<String>),
    /// Forget the room's transcript.
    Clear,
    /// Unknown subcommand or missing argument.
    Usage,
}

impl Command {
    /// Parse a message body. Returns `None` when it is not an `!llm` command.
    pub fn parse(text: &str) -> Option<Command> {
        let rest = text.trim().strip_prefix(PREFIX)?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            // e.g. "!llmfoo"
            return None;
        }

        let rest = rest.trim_start();
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        let first_arg = args.split_whitespace().next();

        let command = match (name, first_arg) {
            ("info", _) => Command::Info,
            ("clear", _) => Command::Clear,
            ("backend", Some(key)) => Command::Backend(key.to_string()),
            ("model", Some(model)) => Command::Model(reset_or(model)),
            // The prompt is everything after the subcommand, spaces included.
            ("system", Some(_)) => Command::System(reset_or(args)),
            _ => Command::Usage,
        };
        Some(command)
    }
}

fn reset_or(value: &str) -> Option<String> {
    (value != "-").then(|| value.to_string())
}

// ─────────────────────────────────────────────
// Info rendering
// ─────────────────────────────────────────────

/// Where an effective room setting comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Setting {
    /// Set on the room.
    Override(String),
    /// Inherited from the backend entry.
    BackendDefault(String),
    /// Neither the room nor the backend names one.
    Unset,
}

impl Setting {
    /// Room override first, then the backend default. Empty values count
    /// as unset.
    pub fn resolve(room: Option<&str>, backend: Option<&str>) -> Self {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }
        match (non_empty(room), non_empty(backend)) {
            (Some(value), _) => Setting::Override(value.to_string()),
            (None, Some(value)) => Setting::BackendDefault(value.to_string()),
            (None, None) => Setting::Unset,
        }
    }

    /// The value that will be sent to the backend.
    pub fn effective(&self) -> Option<&str> {
        match self {
            Setting::Override(value) | Setting::BackendDefault(value) => Some(value.as_str()),
            Setting::Unset => None,
        }
    }

    fn describe(&self, label: &str) -> String {
        match self {
            Setting::Override(value) => format!("- {label}: {value}"),
            Setting::BackendDefault(value) => format!("- {label} (backend default): {value}"),
            Setting::Unset => format!("- {label} not specified"),
        }
    }
}

/// A room's effective configuration, as shown by `!llm info`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomDescription {
    pub backend_key: String,
    pub available_backends: Vec<String>,
    pub model: Setting,
    /// Advisory; `None` when the backend cannot list models.
    pub available_models: Option<Vec<String>>,
    pub system_prompt: Setting,
    pub transcript_length: usize,
}

impl fmt::Display for RoomDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let models = self
            .available_models
            .as_ref()
            .map(|models| models.join(", "))
            .unwrap_or_else(|| "unknown".to_string());

        writeln!(
            f,
            "- Backend: {} (available: {})",
            self.backend_key,
            self.available_backends.join(", ")
        )?;
        writeln!(f, "{} (available: {})", self.model.describe("Model"), models)?;
        writeln!(f, "{}", self.system_prompt.describe("System Prompt"))?;
        write!(f, "- Context Message Count: {}", self.transcript_length)
    }
}

/// Reply to `!llm backend` with an unknown key.
pub fn invalid_backend_reply(available: &[String]) -> String {
    format!("Invalid backend. Available backends: {}", available.join(", "))
}
