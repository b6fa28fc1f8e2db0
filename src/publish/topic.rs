//! In-process topic implementation.

use super::sink::{PublishAck, PublishError, TopicSink};
use crate::types::OutgoingMessage;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default per-subscription buffer size.
const DEFAULT_BUFFER_SIZE: usize = 1000;

/// Default payload ceiling (matches the 256 KiB transport limit).
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 256 * 1024;

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Attribute constraints for a subscription.
///
/// A message matches when every constrained attribute is present with one
/// of the allowed values. An unconstrained filter matches everything.
#[derive(Clone, Debug, Default)]
pub struct DeliveryFilter {
    attributes: HashMap<String, Vec<String>>,
}

impl DeliveryFilter {
    /// Match every message on the topic.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require an attribute to hold one of the given values.
    pub fn attribute(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes.insert(name.into(), values);
        self
    }

    fn matches(&self, message: &OutgoingMessage) -> bool {
        self.attributes.iter().all(|(name, allowed)| {
            message
                .message_attributes
                .get(name)
                .map(|attr| allowed.iter().any(|value| value == &attr.string_value))
                .unwrap_or(false)
        })
    }
}

/// Internal subscription state.
struct Subscription {
    filter: DeliveryFilter,
    sender: Sender<OutgoingMessage>,
}

impl Subscription {
    /// Try to hand over a message. Returns false if the buffer is full or
    /// the receiver is gone (subscriber will be dropped).
    fn try_send(&self, message: OutgoingMessage) -> bool {
        self.sender.try_send(message).is_ok()
    }
}

/// Handle for receiving messages delivered to a subscription.
pub struct DeliveryHandle {
    pub id: SubscriptionId,
    /// Channel carrying delivered messages.
    pub receiver: Receiver<OutgoingMessage>,
}

impl DeliveryHandle {
    /// Receive the next message (blocking).
    pub fn recv(&self) -> Result<OutgoingMessage, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message (non-blocking).
    pub fn try_recv(&self) -> Result<OutgoingMessage, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<OutgoingMessage, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Channel-backed publish-subscribe topic.
///
/// Messages fan out to every subscription whose filter matches the routing
/// attributes. Buffers are bounded; a subscriber that cannot keep up is
/// dropped rather than allowed to block the publisher.
pub struct InProcessTopic {
    /// Topic identifier messages must be addressed to.
    arn: String,

    /// Per-subscription buffer size.
    buffer_size: usize,

    /// Largest accepted message body, in bytes.
    max_payload_bytes: usize,

    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,

    /// Counter for generating subscription IDs.
    next_subscription_id: AtomicU64,

    /// Counter for generating message IDs.
    next_message_id: AtomicU64,
}

impl InProcessTopic {
    /// Create a topic with default limits.
    pub fn new(arn: impl Into<String>) -> Self {
        Self::with_limits(arn, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_PAYLOAD_BYTES)
    }

    /// Create a topic with explicit buffer and payload limits.
    pub fn with_limits(
        arn: impl Into<String>,
        buffer_size: usize,
        max_payload_bytes: usize,
    ) -> Self {
        Self {
            arn: arn.into(),
            buffer_size,
            max_payload_bytes,
            subscriptions: RwLock::new(HashMap::new()),
            next_subscription_id: AtomicU64::new(1),
            next_message_id: AtomicU64::new(1),
        }
    }

    /// Topic identifier.
    pub fn arn(&self) -> &str {
        &self.arn
    }

    /// Register a subscription.
    pub fn subscribe(&self, filter: DeliveryFilter) -> DeliveryHandle {
        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(self.buffer_size);

        self.subscriptions
            .write()
            .insert(id, Subscription { filter, sender });

        DeliveryHandle { id, receiver }
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.write().remove(&id);
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }
}

impl TopicSink for InProcessTopic {
    fn publish(&self, message: &OutgoingMessage) -> Result<PublishAck, PublishError> {
        if message.topic_arn != self.arn {
            return Err(PublishError::WrongTopic {
                expected: self.arn.clone(),
                got: message.topic_arn.clone(),
            });
        }

        let size = message.message.len();
        if size > self.max_payload_bytes {
            return Err(PublishError::PayloadTooLarge {
                size,
                limit: self.max_payload_bytes,
            });
        }

        let mut matched = 0usize;
        let mut delivered = 0usize;
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if sub.filter.matches(message) {
                    matched += 1;
                    if sub.try_send(message.clone()) {
                        delivered += 1;
                    } else {
                        to_remove.push(*id);
                    }
                }
            }
        }

        // Remove dropped subscriptions
        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                subs.remove(&id);
            }
        }

        // A fan-out of zero subscribers is a valid delivery; matched
        // subscribers that all failed to accept is not.
        if matched > 0 && delivered == 0 {
            return Err(PublishError::NoCapacity);
        }

        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        Ok(PublishAck {
            message_id: format!("msg-{}", id),
            delivered,
        })
    }
}
