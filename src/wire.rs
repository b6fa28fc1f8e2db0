//! Wire decoding for changefeed input.
//!
//! The changefeed delivers a batch container with one entry per mutated
//! item. Each entry carries before/after images in the provider's typed
//! scalar encoding; decoding materializes both images as [`Snapshot`]s,
//! empty when absent on the wire.

use crate::error::{NotifierError, Result};
use crate::types::{ScalarValue, Snapshot};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One invocation's worth of change records, in arrival order.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeBatch {
    pub records: Vec<ChangeRecord>,
}

impl ChangeBatch {
    /// Parse a raw invocation payload.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| NotifierError::Decode(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One change notification: before/after images in provider encoding.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeRecord {
    /// Mutation kind as reported by the changefeed. Carried for logging
    /// only; the transform does not branch on it.
    #[serde(default)]
    pub event_name: Option<String>,

    #[serde(default)]
    pub old_image: Option<BTreeMap<String, WireValue>>,

    #[serde(default)]
    pub new_image: Option<BTreeMap<String, WireValue>>,
}

impl ChangeRecord {
    /// Decode the pre-change image.
    ///
    /// An image absent on the wire decodes to an empty snapshot, never to
    /// an absent value: downstream logic tests emptiness by key count.
    pub fn old_snapshot(&self) -> Result<Snapshot> {
        decode_image(self.old_image.as_ref())
    }

    /// Decode the post-change image.
    pub fn new_snapshot(&self) -> Result<Snapshot> {
        decode_image(self.new_image.as_ref())
    }
}

/// Provider-typed scalar encoding.
///
/// `{"S": "text"}`, `{"N": "42.5"}`, `{"BOOL": true}`, `{"NULL": true}`.
/// Numbers ride as strings and are parsed at decode time.
#[derive(Clone, Debug, Deserialize)]
pub enum WireValue {
    #[serde(rename = "S")]
    Text(String),

    #[serde(rename = "N")]
    Number(String),

    #[serde(rename = "BOOL")]
    Bool(bool),

    #[serde(rename = "NULL")]
    Null(bool),
}

impl WireValue {
    fn decode(&self, field: &str) -> Result<ScalarValue> {
        match self {
            WireValue::Text(s) => Ok(ScalarValue::Text(s.clone())),
            WireValue::Number(n) => match n.parse::<f64>() {
                Ok(parsed) => Ok(ScalarValue::Number(parsed)),
                Err(_) => Err(NotifierError::Decode(format!(
                    "field {}: malformed number {:?}",
                    field, n
                ))),
            },
            WireValue::Bool(b) => Ok(ScalarValue::Bool(*b)),
            WireValue::Null(_) => Ok(ScalarValue::Null),
        }
    }
}

fn decode_image(image: Option<&BTreeMap<String, WireValue>>) -> Result<Snapshot> {
    match image {
        Some(image) => image
            .iter()
            .map(|(field, value)| Ok((field.clone(), value.decode(field)?)))
            .collect(),
        None => Ok(Snapshot::new()),
    }
}
