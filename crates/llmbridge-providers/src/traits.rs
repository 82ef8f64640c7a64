//! Backend trait: the seam between the relay and provider HTTP APIs.

use async_trait::async_trait;
use llmbridge_core::{ChatMessage, CompletionResult, Error, Result};

/// A configured LLM provider.
///
/// Instances are cheap and built fresh per request from a config entry; the
/// underlying `reqwest::Client` is shared.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The backend key this instance was built from (e.g. `"openai"`).
    fn key(&self) -> &str;

    /// Human-readable provider name for logging.
    fn display_name(&self) -> &str;

    /// Model used when the room has no override.
    fn default_model(&self) -> Option<&str>;

    /// System prompt used when the room has no override.
    fn default_system_prompt(&self) -> Option<&str>;

    /// Ask the provider for the next assistant message.
    ///
    /// `transcript` is the room history, oldest first. `system` and `model`
    /// are the effective values for the room; a `None` model leaves the
    /// choice to the server.
    ///
    /// Issues exactly one HTTP request. Transport failures, non-success
    /// statuses and bodies missing the expected fields are all
    /// [`Error::Upstream`].
    async fn create_chat_completion(
        &self,
        transcript: &[ChatMessage],
        system: Option<&str>,
        model: Option<&str>,
    ) -> Result<CompletionResult>;

    /// Model identifiers the provider advertises, in provider order.
    async fn fetch_models(&self) -> Result<Vec<String>> {
        Err(Error::unsupported(self.key(), "model listing"))
    }
}
