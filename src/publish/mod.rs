//! Publish-subscribe sink.
//!
//! The transport is abstracted behind the [`TopicSink`] trait; the batch
//! processor only ever sees "publish message with attributes to topic".
//! [`InProcessTopic`] is the channel-backed reference sink:
//! - Attribute-filtered subscriptions
//! - Bounded buffers with slow-subscriber dropping
//! - Destination and payload-size validation
//!
//! # Example
//!
//! ```ignore
//! let topic = InProcessTopic::new("arn:aws:sns:us-east-1:123:revisions");
//! let handle = topic.subscribe(
//!     DeliveryFilter::all().attribute("model", vec!["Widget".to_string()]),
//! );
//!
//! topic.publish(&message)?;
//!
//! while let Ok(delivered) = handle.try_recv() {
//!     println!("Got message: {:?}", delivered);
//! }
//! ```

mod sink;
mod topic;

pub use sink::{PublishAck, PublishError, TopicSink};
pub use topic::{DeliveryFilter, DeliveryHandle, InProcessTopic, SubscriptionId};
