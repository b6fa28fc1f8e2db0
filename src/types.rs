//! Core types for the revision notifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Envelope format version stamped on every revision record.
pub const ENVELOPE_VERSION: &str = "1.0";

/// A scalar field value inside a snapshot.
///
/// Serializes untagged, so snapshots read and write as plain JSON objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ScalarValue {
    /// String form used for routing attributes.
    ///
    /// Null, `false`, zero and the empty string carry no routing value and
    /// never become attributes.
    pub fn routing_value(&self) -> Option<String> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Bool(false) => None,
            ScalarValue::Bool(true) => Some("true".to_string()),
            ScalarValue::Number(n) if *n == 0.0 => None,
            ScalarValue::Number(n) => Some(n.to_string()),
            ScalarValue::Text(s) if s.is_empty() => None,
            ScalarValue::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Number(n)
    }
}

/// A point-in-time key-value image of an entity.
///
/// May be empty: creation has an empty before-image, deletion an empty
/// after-image. Emptiness is tested by key count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<String, ScalarValue>);

impl Snapshot {
    /// Empty snapshot.
    pub fn new() -> Self {
        Snapshot(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up a field value.
    pub fn get(&self, field: &str) -> Option<&ScalarValue> {
        self.0.get(field)
    }

    /// Set a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: ScalarValue) {
        self.0.insert(field.into(), value);
    }
}

impl FromIterator<(String, ScalarValue)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, ScalarValue)>>(iter: I) -> Self {
        Snapshot(iter.into_iter().collect())
    }
}

/// Wall-clock seconds since the Unix epoch, sub-second precision retained.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(pub f64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Timestamp(duration.as_secs_f64())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// The canonical envelope capturing one entity mutation.
///
/// Field order matches the published JSON shape. A record is constructed
/// fresh per change record, never mutated after construction, and discarded
/// after publish.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Actor that made the change; absent on deletion.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub change_initiator: Option<ScalarValue>,

    /// Entity type being tracked.
    pub model: String,

    /// Primary identifier of the mutated entity.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub identifier: Option<ScalarValue>,

    /// Pre-change image (empty on creation).
    pub old_image: Snapshot,

    pub old_schema_version: Option<String>,

    /// Post-change image (empty on deletion).
    pub new_image: Snapshot,

    pub new_schema_version: Option<String>,

    /// Envelope format version, always [`ENVELOPE_VERSION`].
    pub envelope_version: String,

    /// Wall-clock time the record was built.
    pub timestamp: Timestamp,
}

/// A typed routing attribute attached to a published message.
///
/// Subscribers use these for filtering without parsing the message body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttributeValue {
    pub data_type: String,
    pub string_value: String,
}

impl MessageAttributeValue {
    /// String-typed attribute.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".to_string(),
            string_value: value.into(),
        }
    }
}

/// Transport envelope handed to the publish-subscribe sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutgoingMessage {
    /// JSON text of the revision record.
    pub message: String,

    /// Routing attributes, keyed by attribute name.
    pub message_attributes: BTreeMap<String, MessageAttributeValue>,

    /// Destination topic identifier.
    pub topic_arn: String,
}
