//! In-process message bus between a host front-end and the relay.
//!
//! The host publishes [`types::InboundMessage`]s, the relay answers with
//! [`types::OutboundMessage`]s.

pub mod queue;
pub mod types;

pub use queue::MessageBus;
pub use types::{InboundMessage, OutboundKind, OutboundMessage};
