//! Notifier configuration.

use crate::error::{NotifierError, Result};
use std::env;

const TOPIC_ARN_VAR: &str = "REVISION_RECORD_TOPIC_ARN";
const MODEL_NAME_VAR: &str = "MODEL_NAME";
const SCHEMA_VERSION_VAR: &str = "MODEL_SCHEMA_VERSION";
const IDENTIFIER_FIELD_VAR: &str = "MODEL_IDENTIFIER_FIELD";
const ADDITIONAL_FIELDS_VAR: &str = "ADDITIONAL_MODEL_IDENTIFIER_FIELD";

/// Static notifier configuration.
///
/// Constructed once at process start and passed by reference into the
/// batch processor; nothing reads the environment after construction.
#[derive(Clone, Debug)]
pub struct NotifierConfig {
    /// Destination topic identifier.
    pub topic_arn: String,

    /// Entity-type label stamped on every revision record.
    pub model_name: String,

    /// Schema version applied to both sides of the envelope.
    pub schema_version: String,

    /// Snapshot field holding the primary identifier.
    pub identifier_field: String,

    /// Extra snapshot fields surfaced as routing attributes.
    pub additional_identifier_fields: Vec<String>,
}

impl NotifierConfig {
    /// Read configuration from the process environment.
    ///
    /// Fails fast on a missing or empty required option.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            topic_arn: require(TOPIC_ARN_VAR)?,
            model_name: require(MODEL_NAME_VAR)?,
            schema_version: require(SCHEMA_VERSION_VAR)?,
            identifier_field: require(IDENTIFIER_FIELD_VAR)?,
            additional_identifier_fields: split_fields(
                env::var(ADDITIONAL_FIELDS_VAR).ok().as_deref(),
            ),
        })
    }
}

fn require(name: &'static str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(NotifierError::MissingOption(name)),
    }
}

/// Split a colon-separated field list, discarding empty segments.
pub fn split_fields(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) => raw
            .split(':')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}
