//! Bus event types: messages flowing between the host and the relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inbound room message from the host.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Room the message was posted in.
    pub room_id: String,
    /// Sender identifier (checked against the allowlist).
    pub sender_id: String,
    /// Text content of the message.
    pub content: String,
    /// When the message was received.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(
        room_id: impl Into<String>,
        sender_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        InboundMessage {
            room_id: room_id.into(),
            sender_id: sender_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether the message is a bot command rather than chat text.
    pub fn is_command(&self) -> bool {
        self.content.starts_with('!')
    }
}

/// How the host should deliver an outbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboundKind {
    /// A regular text reply in the room.
    Reply,
    /// A reaction to the triggering message (e.g. `✅`).
    Reaction,
}

/// An outbound message from the relay to the host.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Target room.
    pub room_id: String,
    /// Reply text, or the reaction key for [`OutboundKind::Reaction`].
    pub content: String,
    pub kind: OutboundKind,
}

impl OutboundMessage {
    /// A text reply.
    pub fn reply(room_id: impl Into<String>, content: impl Into<String>) -> Self {
        OutboundMessage {
            room_id: room_id.into(),
            content: content.into(),
            kind: OutboundKind::Reply,
        }
    }

    /// A reaction to the triggering message.
    pub fn reaction(room_id: impl Into<String>, key: impl Into<String>) -> Self {
        OutboundMessage {
            room_id: room_id.into(),
            content: key.into(),
            kind: OutboundKind::Reaction,
        }
    }
}
