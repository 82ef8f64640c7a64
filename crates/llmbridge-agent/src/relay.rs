//! Relay: turns room messages into backend completions.
//!
//! For each chat message the relay resolves the room's session and backend,
//! records the user turn, sends the whole transcript to the backend and
//! records the reply. Turns for one room are serialized; different rooms run
//! concurrently.

use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use llmbridge_core::bus::{InboundMessage, MessageBus, OutboundMessage};
use llmbridge_core::config::Config;
use llmbridge_core::session::{Session, SessionStore};
use llmbridge_core::{ChatMessage, Error, Result, Role};
use llmbridge_providers::{backend_for_key, build_http_client, Backend};

use crate::commands::{invalid_backend_reply, Command, RoomDescription, Setting, ACK_REACTION, USAGE};
use crate::room_lock::RoomLocks;

// ─────────────────────────────────────────────
// Relay
// ─────────────────────────────────────────────

pub struct Relay {
    config: Config,
    store: SessionStore,
    http: reqwest::Client,
    locks: RoomLocks,
}

impl Relay {
    pub fn new(config: Config, store: SessionStore, http: reqwest::Client) -> Self {
        Self {
            config,
            store,
            http,
            locks: RoomLocks::new(),
        }
    }

    /// Validate `config`, open its database and build the shared HTTP client.
    pub async fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let store = SessionStore::connect(&config.database.resolved_url()).await?;
        let http = build_http_client(&config.http)?;
        Ok(Self::new(config, store, http))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn is_allowed(&self, sender_id: &str) -> bool {
        self.config.allowlist.allows(sender_id)
    }

    /// Configured backend keys, sorted.
    pub fn list_backend_keys(&self) -> Vec<String> {
        self.config.backend_keys()
    }

    fn backend_key<'a>(&'a self, session: &'a Session) -> &'a str {
        session
            .backend_key
            .as_deref()
            .unwrap_or(&self.config.default_backend)
    }

    fn backend_for(&self, session: &Session) -> Result<Box<dyn Backend>> {
        backend_for_key(&self.config, self.backend_key(session), self.http.clone())
    }

    /// Run one conversational turn and return the recorded reply.
    ///
    /// The user message is recorded before the backend is called and stays
    /// recorded if the call fails.
    pub async fn handle_inbound_message(
        &self,
        room_id: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<ChatMessage> {
        if !self.is_allowed(sender_id) {
            warn!(room_id, sender_id, "rejected sender not on allowlist");
            return Err(Error::SenderNotAllowed(sender_id.to_string()));
        }

        let _turn = self.locks.lock(room_id).await;

        let session = self.store.get_or_create(room_id).await?;
        let backend = self.backend_for(&session)?;
        let model_setting = Setting::resolve(session.model.as_deref(), backend.default_model());
        let system_setting = Setting::resolve(
            session.system_prompt.as_deref(),
            backend.default_system_prompt(),
        );
        let model = model_setting.effective();
        let system = system_setting.effective();

        self.store.append_message(room_id, Role::User, text).await?;
        let transcript = self.store.fetch_transcript(room_id).await?;

        debug!(
            room_id,
            backend = backend.key(),
            model = model.unwrap_or("(default)"),
            context = transcript.len(),
            "requesting completion"
        );

        let completion = match backend
            .create_chat_completion(&transcript, system, model)
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                error!(room_id, backend = backend.key(), error = %e, "completion failed");
                return Err(e);
            }
        };

        info!(
            room_id,
            backend = backend.key(),
            finish_reason = %completion.finish_reason,
            model = completion.model.as_deref().unwrap_or("?"),
            "completion received"
        );

        let reply = completion.message;
        self.store
            .append_message(room_id, reply.role, &reply.content)
            .await?;
        Ok(reply)
    }

    /// The room's effective configuration. Model listing is best-effort.
    pub async fn describe_room_config(&self, room_id: &str) -> Result<RoomDescription> {
        let session = self.store.get_or_create(room_id).await?;
        let backend = self.backend_for(&session)?;

        let available_models = match backend.fetch_models().await {
            Ok(models) => Some(models),
            Err(e) => {
                debug!(room_id, backend = backend.key(), error = %e, "model listing unavailable");
                None
            }
        };

        Ok(RoomDescription {
            backend_key: backend.key().to_string(),
            available_backends: self.list_backend_keys(),
            model: Setting::resolve(session.model.as_deref(), backend.default_model()),
            available_models,
            system_prompt: Setting::resolve(
                session.system_prompt.as_deref(),
                backend.default_system_prompt(),
            ),
            transcript_length: self.store.transcript_len(room_id).await?,
        })
    }

    /// Point the room at another backend; `None` restores the default.
    pub async fn set_backend(&self, room_id: &str, backend_key: Option<&str>) -> Result<()> {
        if let Some(key) = backend_key {
            self.config.backend(key)?;
        }
        self.store.set_backend(room_id, backend_key).await
    }

    pub async fn set_model(&self, room_id: &str, model: Option<&str>) -> Result<()> {
        self.store.set_model(room_id, model).await
    }

    pub async fn set_system_prompt(&self, room_id: &str, prompt: Option<&str>) -> Result<()> {
        self.store.set_system_prompt(room_id, prompt).await
    }

    /// Forget the room's transcript. Waits for an in-flight turn to finish.
    pub async fn clear_room(&self, room_id: &str) -> Result<()> {
        let _turn = self.locks.lock(room_id).await;
        self.store.clear_transcript(room_id).await?;
        info!(room_id, "context cleared");
        Ok(())
    }

    // ─────────────────────────────────────────
    // Host-facing dispatch
    // ─────────────────────────────────────────

    /// Handle one inbound room message and produce what should be posted
    /// back, if anything.
    ///
    /// Messages from senders off the allowlist and `!` messages that are not
    /// `!llm` commands are ignored. Failed turns are logged and produce no
    /// reply.
    pub async fn handle(&self, msg: &InboundMessage) -> Option<OutboundMessage> {
        if !self.is_allowed(&msg.sender_id) {
            warn!(room_id = %msg.room_id, sender_id = %msg.sender_id, "rejected sender not on allowlist");
            return None;
        }

        if msg.is_command() {
            let command = Command::parse(&msg.content)?;
            return match self.run_command(&msg.room_id, command).await {
                Ok(out) => Some(out),
                Err(e) => {
                    error!(room_id = %msg.room_id, error = %e, "command failed");
                    None
                }
            };
        }

        match self
            .handle_inbound_message(&msg.room_id, &msg.sender_id, &msg.content)
            .await
        {
            Ok(reply) => Some(OutboundMessage::reply(&msg.room_id, reply.content)),
            // Already logged with context.
            Err(_) => None,
        }
    }

    async fn run_command(&self, room_id: &str, command: Command) -> Result<OutboundMessage> {
        debug!(room_id, ?command, "running command");
        let ack = || OutboundMessage::reaction(room_id, ACK_REACTION);

        match command {
            Command::Info => {
                let description = self.describe_room_config(room_id).await?;
                Ok(OutboundMessage::reply(room_id, description.to_string()))
            }
            Command::Backend(key) => match self.set_backend(room_id, Some(key.as_str())).await {
                Ok(()) => Ok(ack()),
                Err(Error::Configuration(_)) => Ok(OutboundMessage::reply(
                    room_id,
                    invalid_backend_reply(&self.list_backend_keys()),
                )),
                Err(e) => Err(e),
            },
            Command::Model(model) => {
                self.set_model(room_id, model.as_deref()).await?;
                Ok(ack())
            }
            Command::System(prompt) => {
                self.set_system_prompt(room_id, prompt.as_deref()).await?;
                Ok(ack())
            }
            Command::Clear => {
                self.clear_room(room_id).await?;
                Ok(ack())
            }
            Command::Usage => Ok(OutboundMessage::reply(room_id, USAGE)),
        }
    }

    /// Consume inbound messages from `bus` until it closes.
    ///
    /// Each message is handled on its own task; per-room locks keep turns
    /// for one room from overlapping. Returns once the inbound side is
    /// closed and every in-flight turn has published its reply.
    pub async fn run(self: Arc<Self>, bus: Arc<MessageBus>) {
        info!("relay started, waiting for messages");
        let mut turns = JoinSet::new();

        loop {
            tokio::select! {
                msg = bus.consume_inbound() => {
                    let Some(msg) = msg else { break };
                    debug!(room_id = %msg.room_id, sender_id = %msg.sender_id, "received message");

                    let relay = Arc::clone(&self);
                    let bus = Arc::clone(&bus);
                    turns.spawn(async move {
                        if let Some(out) = relay.handle(&msg).await {
                            if let Err(e) = bus.publish_outbound(out).await {
                                error!(error = %e, "failed to publish outbound message");
                            }
                        }
                    });
                }
                Some(done) = turns.join_next(), if !turns.is_empty() => log_turn_exit(done),
            }
        }

        if !turns.is_empty() {
            info!(in_flight = turns.len(), "inbound channel closed, finishing in-flight turns");
        }
        while let Some(done) = turns.join_next().await {
            log_turn_exit(done);
        }
        info!("inbound channel closed, relay exiting");
    }
}

fn log_turn_exit(done: std::result::Result<(), JoinError>) {
    if let Err(e) = done {
        error!(error = %e, "relay task panicked");
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use llmbridge_core::bus::OutboundKind;
    use llmbridge_core::config::{Allowlist, AnthropicConfig, BackendConfig, BasicOpenAiConfig};
    use llmbridge_core::session::DatabasePool;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn local_backend(uri: &str) -> BackendConfig {
        BackendConfig::BasicOpenai(BasicOpenAiConfig {
            base_url: uri.to_string(),
            api_prefix: "/v1".to_string(),
            ..Default::default()
        })
    }

    fn config_for(uri: &str) -> Config {
        let mut config = Config::default();
        config.backends.clear();
        config.backends.insert("local".to_string(), local_backend(uri));
        config.backends.insert(
            "claude".to_string(),
            BackendConfig::Anthropic(AnthropicConfig {
                base_url: Some(uri.to_string()),
                api_key: "sk-ant".to_string(),
                ..Default::default()
            }),
        );
        config.default_backend = "local".to_string();
        config
    }

    async fn relay_with(config: Config) -> Relay {
        let store = SessionStore::new(DatabasePool::in_memory().await.unwrap());
        Relay::new(config, store, reqwest::Client::new())
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "m",
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
    }

    async fn mount_reply(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(reply(content))
            .mount(server)
            .await;
    }

    async fn last_request_body(server: &MockServer) -> serde_json::Value {
        let requests = server.received_requests().await.unwrap();
        serde_json::from_slice(&requests.last().unwrap().body).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let server = MockServer::start().await;
        mount_reply(&server, "hello").await;
        let relay = relay_with(config_for(&server.uri())).await;

        let reply = relay.handle_inbound_message("a", "@u", "hi").await.unwrap();

        assert_eq!(reply, ChatMessage::assistant("hello"));
        assert_eq!(
            relay.store().fetch_transcript("a").await.unwrap(),
            vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")]
        );
    }

    #[tokio::test]
    async fn test_end_to_end_failure_keeps_user_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        let relay = relay_with(config_for(&server.uri())).await;

        let err = relay.handle_inbound_message("a", "@u", "hi").await.unwrap_err();

        assert!(matches!(err, Error::Upstream { .. }));
        assert_eq!(
            relay.store().fetch_transcript("a").await.unwrap(),
            vec![ChatMessage::user("hi")]
        );
    }

    #[tokio::test]
    async fn test_full_transcript_is_sent() {
        let server = MockServer::start().await;
        mount_reply(&server, "ok").await;
        let relay = relay_with(config_for(&server.uri())).await;

        relay.handle_inbound_message("a", "@u", "one").await.unwrap();
        relay.handle_inbound_message("a", "@u", "two").await.unwrap();

        let body = last_request_body(&server).await;
        assert_eq!(
            body["messages"],
            serde_json::json!([
                {"role": "user", "content": "one"},
                {"role": "assistant", "content": "ok"},
                {"role": "user", "content": "two"}
            ])
        );
    }

    #[tokio::test]
    async fn test_override_precedence() {
        let server = MockServer::start().await;
        mount_reply(&server, "ok").await;

        let mut config = config_for(&server.uri());
        config.backends.insert(
            "local".to_string(),
            BackendConfig::BasicOpenai(BasicOpenAiConfig {
                base_url: server.uri(),
                api_prefix: "/v1".to_string(),
                default_model: Some("dm".to_string()),
                default_system_prompt: Some("D".to_string()),
                ..Default::default()
            }),
        );
        let relay = relay_with(config).await;

        relay.handle_inbound_message("a", "@u", "1").await.unwrap();
        let body = last_request_body(&server).await;
        assert_eq!(body["model"], "dm");
        assert_eq!(body["messages"][0], serde_json::json!({"role": "system", "content": "D"}));

        relay.set_model("a", Some("om")).await.unwrap();
        relay.set_system_prompt("a", Some("S")).await.unwrap();
        relay.handle_inbound_message("a", "@u", "2").await.unwrap();
        let body = last_request_body(&server).await;
        assert_eq!(body["model"], "om");
        assert_eq!(body["messages"][0], serde_json::json!({"role": "system", "content": "S"}));

        relay.set_model("a", None).await.unwrap();
        relay.handle_inbound_message("a", "@u", "3").await.unwrap();
        assert_eq!(last_request_body(&server).await["model"], "dm");

        relay.set_model("a", Some("")).await.unwrap();
        relay.set_system_prompt("a", Some("")).await.unwrap();
        relay.handle_inbound_message("a", "@u", "4").await.unwrap();
        let body = last_request_body(&server).await;
        assert_eq!(body["model"], "dm");
        assert_eq!(body["messages"][0], serde_json::json!({"role": "system", "content": "D"}));
    }

    #[tokio::test]
    async fn test_no_model_and_no_system_when_unset() {
        let server = MockServer::start().await;
        mount_reply(&server, "ok").await;
        let relay = relay_with(config_for(&server.uri())).await;

        relay.handle_inbound_message("a", "@u", "hi").await.unwrap();

        let body = last_request_body(&server).await;
        assert!(body.get("model").is_none());
        assert_eq!(body["messages"], serde_json::json!([{"role": "user", "content": "hi"}]));
    }

    #[tokio::test]
    async fn test_room_backend_switch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "role": "assistant",
                "content": [{"type": "text", "text": "from claude"}],
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;
        let relay = relay_with(config_for(&server.uri())).await;

        relay.set_backend("a", Some("claude")).await.unwrap();
        let reply = relay.handle_inbound_message("a", "@u", "hi").await.unwrap();
        assert_eq!(reply.content, "from claude");
    }

    #[tokio::test]
    async fn test_set_unknown_backend_is_rejected() {
        let relay = relay_with(config_for("http://127.0.0.1:1")).await;

        let err = relay.set_backend("a", Some("ghost")).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(relay.store().fetch_session("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_backend_key_is_configuration_error() {
        let relay = relay_with(config_for("http://127.0.0.1:1")).await;
        // e.g. a key removed from the config after the room picked it
        relay.store().set_backend("a", Some("removed")).await.unwrap();

        let err = relay.handle_inbound_message("a", "@u", "hi").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(relay.store().fetch_transcript("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sender_not_allowed() {
        let mut config = config_for("http://127.0.0.1:1");
        config.allowlist = Allowlist::Senders(vec!["@ok".to_string()]);
        let relay = relay_with(config).await;

        let err = relay.handle_inbound_message("a", "@stranger", "hi").await.unwrap_err();
        assert!(matches!(err, Error::SenderNotAllowed(_)));
        assert!(relay.store().fetch_session("a").await.unwrap().is_none());

        let ignored = relay.handle(&InboundMessage::new("a", "@stranger", "!llm clear")).await;
        assert!(ignored.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_messages_alternate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("ack").set_delay(Duration::from_millis(30)))
            .mount(&server)
            .await;
        let relay = Arc::new(relay_with(config_for(&server.uri())).await);

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let relay = Arc::clone(&relay);
                tokio::spawn(async move {
                    relay
                        .handle_inbound_message("busy", "@u", &format!("msg {i}"))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let transcript = relay.store().fetch_transcript("busy").await.unwrap();
        assert_eq!(transcript.len(), 10);
        for (i, entry) in transcript.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(entry.role, expected, "entry {i} out of order: {transcript:?}");
        }
    }

    #[tokio::test]
    async fn test_describe_room_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "llama"}, {"id": "qwen"}]
            })))
            .mount(&server)
            .await;
        mount_reply(&server, "ok").await;
        let relay = relay_with(config_for(&server.uri())).await;

        relay.handle_inbound_message("a", "@u", "hi").await.unwrap();
        relay.set_system_prompt("a", Some("S")).await.unwrap();

        let description = relay.describe_room_config("a").await.unwrap();
        assert_eq!(description.backend_key, "local");
        assert_eq!(description.available_backends, vec!["claude", "local"]);
        assert_eq!(description.model, Setting::Unset);
        assert_eq!(
            description.available_models,
            Some(vec!["llama".to_string(), "qwen".to_string()])
        );
        assert_eq!(description.system_prompt, Setting::Override("S".to_string()));
        assert_eq!(description.transcript_length, 2);
    }

    #[tokio::test]
    async fn test_describe_degrades_without_model_listing() {
        let relay = relay_with(config_for("http://127.0.0.1:1")).await;
        relay.set_backend("a", Some("claude")).await.unwrap();

        let description = relay.describe_room_config("a").await.unwrap();
        assert_eq!(description.backend_key, "claude");
        assert_eq!(description.available_models, None);
        assert!(description.to_string().contains("(available: unknown)"));
    }

    #[tokio::test]
    async fn test_clear_room_keeps_overrides() {
        let server = MockServer::start().await;
        mount_reply(&server, "ok").await;
        let relay = relay_with(config_for(&server.uri())).await;

        relay.set_model("a", Some("x")).await.unwrap();
        relay.handle_inbound_message("a", "@u", "hi").await.unwrap();
        relay.clear_room("a").await.unwrap();

        assert!(relay.store().fetch_transcript("a").await.unwrap().is_empty());
        let session = relay.store().get_or_create("a").await.unwrap();
        assert_eq!(session.model.as_deref(), Some("x"));
    }

    // ── Host dispatch ──

    #[tokio::test]
    async fn test_commands_via_handle() {
        let relay = relay_with(config_for("http://127.0.0.1:1")).await;

        let out = relay
            .handle(&InboundMessage::new("a", "@u", "!llm backend nope"))
            .await
            .unwrap();
        assert_eq!(out.kind, OutboundKind::Reply);
        assert_eq!(out.content, "Invalid backend. Available backends: claude, local");

        let out = relay
            .handle(&InboundMessage::new("a", "@u", "!llm backend claude"))
            .await
            .unwrap();
        assert_eq!(out.kind, OutboundKind::Reaction);
        assert_eq!(out.content, ACK_REACTION);

        relay
            .handle(&InboundMessage::new("a", "@u", "!llm model big-model"))
            .await
            .unwrap();
        relay
            .handle(&InboundMessage::new("a", "@u", "!llm system Talk like a pirate."))
            .await
            .unwrap();

        let session = relay.store().get_or_create("a").await.unwrap();
        assert_eq!(session.backend_key.as_deref(), Some("claude"));
        assert_eq!(session.model.as_deref(), Some("big-model"));
        assert_eq!(session.system_prompt.as_deref(), Some("Talk like a pirate."));

        relay
            .handle(&InboundMessage::new("a", "@u", "!llm model -"))
            .await
            .unwrap();
        let session = relay.store().get_or_create("a").await.unwrap();
        assert_eq!(session.model, None);

        let out = relay
            .handle(&InboundMessage::new("a", "@u", "!llm"))
            .await
            .unwrap();
        assert_eq!(out.content, USAGE);
    }

    #[tokio::test]
    async fn test_other_bang_messages_are_ignored() {
        let server = MockServer::start().await;
        mount_reply(&server, "should not happen").await;
        let relay = relay_with(config_for(&server.uri())).await;

        let out = relay.handle(&InboundMessage::new("a", "@u", "!ping")).await;
        assert!(out.is_none());
        assert!(relay.store().fetch_transcript("a").await.unwrap().is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_turn_produces_no_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let relay = relay_with(config_for(&server.uri())).await;

        let out = relay.handle(&InboundMessage::new("a", "@u", "hi")).await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_run_loop_publishes_replies() {
        let server = MockServer::start().await;
        mount_reply(&server, "hello").await;
        let relay = Arc::new(relay_with(config_for(&server.uri())).await);
        let bus = Arc::new(MessageBus::new(16));

        let runner = tokio::spawn(Arc::clone(&relay).run(Arc::clone(&bus)));

        bus.publish_inbound(InboundMessage::new("a", "@u", "hi"))
            .await
            .unwrap();
        let out = tokio::time::timeout(Duration::from_secs(5), bus.consume_outbound())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(out.room_id, "a");
        assert_eq!(out.kind, OutboundKind::Reply);
        assert_eq!(out.content, "hello");

        runner.abort();
    }

    #[tokio::test]
    async fn test_run_finishes_in_flight_turns_after_close() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(reply("late but delivered").set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        let relay = Arc::new(relay_with(config_for(&server.uri())).await);
        let bus = Arc::new(MessageBus::new(16));

        bus.publish_inbound(InboundMessage::new("a", "@u", "hi"))
            .await
            .unwrap();
        bus.close_inbound();

        tokio::time::timeout(Duration::from_secs(5), Arc::clone(&relay).run(Arc::clone(&bus)))
            .await
            .unwrap();

        // run has returned, so the reply is already queued.
        bus.close_outbound();
        let out = bus.consume_outbound().await.unwrap();
        assert_eq!(out.content, "late but delivered");
        assert!(bus.consume_outbound().await.is_none());
        assert_eq!(relay.store().transcript_len("a").await.unwrap(), 2);
    }
}
