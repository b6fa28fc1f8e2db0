//! Publisher seam to the external transport.

use crate::types::OutgoingMessage;
use thiserror::Error;

/// Sink acknowledgment for a published message.
#[derive(Clone, Debug)]
pub struct PublishAck {
    /// Sink-assigned message id.
    pub message_id: String,

    /// Subscriptions the message was handed to. Zero is a valid fan-out.
    pub delivered: usize,
}

/// Why a sink rejected a message.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Message addressed to {got}, topic is {expected}")]
    WrongTopic { expected: String, got: String },

    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("No subscriber could accept the message")]
    NoCapacity,
}

/// The publish-subscribe transport.
///
/// Implementations deliver one message with its routing attributes to one
/// topic. The call must not block the caller on downstream consumers; the
/// batch processor treats the outcome as log material only.
pub trait TopicSink {
    fn publish(&self, message: &OutgoingMessage) -> Result<PublishAck, PublishError>;
}
