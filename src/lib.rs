//! # Revision Notifier
//!
//! A single-purpose event transformer: each change-notification record from
//! a changefeed (before/after snapshots of one mutated item) becomes a
//! canonical revision-record envelope, published to a pub-sub topic with
//! routing attributes attached.
//!
//! ## Core Concepts
//!
//! - **Change records**: One changefeed entry per mutated item, decoded from
//!   the provider's typed wire encoding
//! - **Revision records**: Immutable envelopes carrying both images, the
//!   resolved identifier, and schema/envelope versions
//! - **Routing attributes**: Typed string attributes subscribers filter on
//!   without parsing the message body
//! - **Topic sink**: The transport seam; an in-process channel-backed topic
//!   is provided
//!
//! ## Example
//!
//! ```ignore
//! use revision_notifier::{
//!     ChangeBatch, DeliveryFilter, InProcessTopic, Notifier, NotifierConfig,
//! };
//!
//! let config = NotifierConfig::from_env()?;
//! let topic = InProcessTopic::new(&config.topic_arn);
//! let subscriber = topic.subscribe(DeliveryFilter::all());
//!
//! let notifier = Notifier::new(config, topic);
//! let batch = ChangeBatch::from_json(&payload)?;
//! let summary = notifier.process_batch(&batch)?;
//! println!("{}", summary);
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod processor;
pub mod publish;
pub mod record;
pub mod types;
pub mod wire;

// Re-exports
pub use config::NotifierConfig;
pub use error::{NotifierError, Result};
pub use message::{build_message, MessageBuilder};
pub use processor::{BatchSummary, Notifier};
pub use publish::{
    DeliveryFilter, DeliveryHandle, InProcessTopic, PublishAck, PublishError, SubscriptionId,
    TopicSink,
};
pub use record::{
    build_revision_record, build_revision_record_at, change_initiator, resolve_schema_versions,
    select_identifier, INITIATOR_FIELD,
};
pub use types::{
    MessageAttributeValue, OutgoingMessage, RevisionRecord, ScalarValue, Snapshot, Timestamp,
    ENVELOPE_VERSION,
};
pub use wire::{ChangeBatch, ChangeRecord, WireValue};
