//! Async message bus on tokio bounded mpsc channels.

use std::sync::{Mutex, PoisonError};

use super::types::{InboundMessage, OutboundMessage};
use tokio::sync::mpsc;

/// The message bus connecting the host ↔ relay.
///
/// - The host publishes to `inbound` (room messages arriving)
/// - The relay consumes from `inbound`, processes, publishes to `outbound`
/// - The host consumes from `outbound` and delivers to the room
///
/// Either direction can be closed: publishing then fails, and consumers
/// drain what is already queued before seeing `None`.
pub struct MessageBus {
    inbound_tx: Mutex<Option<mpsc::Sender<InboundMessage>>>,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    outbound_tx: Mutex<Option<mpsc::Sender<OutboundMessage>>>,
    outbound_rx: tokio::sync::Mutex<mpsc::Receiver<OutboundMessage>>,
}

fn sender<T>(slot: &Mutex<Option<mpsc::Sender<T>>>) -> Option<mpsc::Sender<T>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn close<T>(slot: &Mutex<Option<mpsc::Sender<T>>>) {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take();
}

impl MessageBus {
    /// Create a new message bus with the given buffer capacity.
    pub fn new(buffer_size: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer_size);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer_size);

        MessageBus {
            inbound_tx: Mutex::new(Some(inbound_tx)),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            outbound_tx: Mutex::new(Some(outbound_tx)),
            outbound_rx: tokio::sync::Mutex::new(outbound_rx),
        }
    }

    pub async fn publish_inbound(
        &self,
        msg: InboundMessage,
    ) -> Result<(), mpsc::error::SendError<InboundMessage>> {
        match sender(&self.inbound_tx) {
            Some(tx) => tx.send(msg).await,
            None => Err(mpsc::error::SendError(msg)),
        }
    }

    /// Consume the next inbound message (waits until available).
    /// Returns None once the inbound side is closed and drained.
    pub async fn consume_inbound(&self) -> Option<InboundMessage> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await
    }

    pub async fn publish_outbound(
        &self,
        msg: OutboundMessage,
    ) -> Result<(), mpsc::error::SendError<OutboundMessage>> {
        match sender(&self.outbound_tx) {
            Some(tx) => tx.send(msg).await,
            None => Err(mpsc::error::SendError(msg)),
        }
    }

    /// Consume the next outbound message (waits until available).
    /// Returns None once the outbound side is closed and drained.
    pub async fn consume_outbound(&self) -> Option<OutboundMessage> {
        let mut rx = self.outbound_rx.lock().await;
        rx.recv().await
    }

    /// Stop accepting inbound messages. The relay's run loop ends after
    /// the queued ones.
    pub fn close_inbound(&self) {
        close(&self.inbound_tx);
    }

    /// Stop accepting outbound messages.
    pub fn close_outbound(&self) {
        close(&self.outbound_tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::types::OutboundKind;

    #[tokio::test]
    async fn test_inbound_message_flow() {
        let bus = MessageBus::new(10);

        let msg = InboundMessage::new("room_1", "user_1", "Hello!");
        bus.publish_inbound(msg).await.unwrap();

        let received = bus.consume_inbound().await.unwrap();
        assert_eq!(received.room_id, "room_1");
        assert_eq!(received.content, "Hello!");
    }

    #[tokio::test]
    async fn test_outbound_message_flow() {
        let bus = MessageBus::new(10);

        bus.publish_outbound(OutboundMessage::reaction("room_42", "✅"))
            .await
            .unwrap();

        let received = bus.consume_outbound().await.unwrap();
        assert_eq!(received.room_id, "room_42");
        assert_eq!(received.kind, OutboundKind::Reaction);
    }

    #[tokio::test]
    async fn test_preserves_order() {
        let bus = MessageBus::new(10);
        for i in 0..5 {
            bus.publish_inbound(InboundMessage::new("r", "u", format!("m{i}")))
                .await
                .unwrap();
        }
        for i in 0..5 {
            let msg = bus.consume_inbound().await.unwrap();
            assert_eq!(msg.content, format!("m{i}"));
        }
    }

    #[tokio::test]
    async fn test_close_inbound_drains_then_ends() {
        let bus = MessageBus::new(10);
        bus.publish_inbound(InboundMessage::new("r", "u", "queued"))
            .await
            .unwrap();
        bus.close_inbound();

        assert!(bus
            .publish_inbound(InboundMessage::new("r", "u", "late"))
            .await
            .is_err());
        assert_eq!(bus.consume_inbound().await.unwrap().content, "queued");
        assert!(bus.consume_inbound().await.is_none());
    }

    #[tokio::test]
    async fn test_close_outbound_drains_then_ends() {
        let bus = MessageBus::new(10);
        bus.publish_outbound(OutboundMessage::reply("r", "last"))
            .await
            .unwrap();
        bus.close_outbound();

        assert_eq!(bus.consume_outbound().await.unwrap().content, "last");
        assert!(bus.consume_outbound().await.is_none());
    }
}
