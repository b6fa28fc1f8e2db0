//! Outgoing message assembly.

use crate::config::NotifierConfig;
use crate::error::Result;
use crate::types::{MessageAttributeValue, OutgoingMessage, RevisionRecord};
use std::collections::BTreeMap;

/// Builds the transport envelope for one revision record.
///
/// The attributes container is initialized at construction; no conditional
/// step can ever write into an uninitialized map, regardless of the order
/// the steps run in.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    body: String,
    attributes: BTreeMap<String, MessageAttributeValue>,
    topic_arn: String,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            attributes: BTreeMap::new(),
            topic_arn: String::new(),
        }
    }

    /// Step 1: JSON body of the full revision record, empty images included.
    pub fn body(mut self, record: &RevisionRecord) -> Result<Self> {
        self.body = serde_json::to_string(record)?;
        Ok(self)
    }

    /// Step 2: the four fixed String attributes.
    ///
    /// An unset schema version becomes an empty value; the key is never
    /// omitted.
    pub fn fixed_attributes(mut self, record: &RevisionRecord) -> Self {
        self.attributes.insert(
            "envelope_version".to_string(),
            MessageAttributeValue::string(record.envelope_version.as_str()),
        );
        self.attributes.insert(
            "old_schema_version".to_string(),
            MessageAttributeValue::string(record.old_schema_version.clone().unwrap_or_default()),
        );
        self.attributes.insert(
            "new_schema_version".to_string(),
            MessageAttributeValue::string(record.new_schema_version.clone().unwrap_or_default()),
        );
        self.attributes.insert(
            "model".to_string(),
            MessageAttributeValue::string(record.model.as_str()),
        );
        self
    }

    /// Step 3: configured extra identifier fields.
    ///
    /// Each field is read from the post-change image when non-empty, else
    /// the pre-change image, and added only when the value has a routing
    /// form. Skipped entirely when no fields are configured.
    pub fn additional_attributes(mut self, record: &RevisionRecord, fields: &[String]) -> Self {
        if fields.is_empty() {
            return self;
        }

        let model_data = if record.new_image.is_empty() {
            &record.old_image
        } else {
            &record.new_image
        };

        for field in fields {
            if let Some(value) = model_data.get(field).and_then(|v| v.routing_value()) {
                self.attributes
                    .insert(field.clone(), MessageAttributeValue::string(value));
            }
        }
        self
    }

    /// Step 4: destination topic.
    pub fn topic(mut self, arn: &str) -> Self {
        self.topic_arn = arn.to_string();
        self
    }

    pub fn build(self) -> OutgoingMessage {
        OutgoingMessage {
            message: self.body,
            message_attributes: self.attributes,
            topic_arn: self.topic_arn,
        }
    }
}

/// Assemble the complete outgoing message for one revision record.
pub fn build_message(record: &RevisionRecord, config: &NotifierConfig) -> Result<OutgoingMessage> {
    Ok(MessageBuilder::new()
        .body(record)?
        .fixed_attributes(record)
        .additional_attributes(record, &config.additional_identifier_fields)
        .topic(&config.topic_arn)
        .build())
}
