//! Batch processor driving the transform-and-publish pipeline.

use crate::config::NotifierConfig;
use crate::error::Result;
use crate::message::build_message;
use crate::publish::TopicSink;
use crate::record::{build_revision_record, change_initiator, select_identifier};
use crate::wire::{ChangeBatch, ChangeRecord};
use std::fmt;
use tracing::{debug, error};

/// Completion report for one processed batch.
///
/// The count is records RECEIVED, not publishes confirmed: a publish
/// failure is logged against its record and does not reduce the count.
/// Consumers needing confirmed-delivery counts must derive them from the
/// sink acknowledgments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchSummary {
    pub records_received: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully processed {} records.",
            self.records_received
        )
    }
}

/// Drives decode → select → build → publish for each record of a batch.
///
/// Holds no state between batches; records within a batch share nothing.
pub struct Notifier<S: TopicSink> {
    config: NotifierConfig,
    sink: S,
}

impl<S: TopicSink> Notifier<S> {
    pub fn new(config: NotifierConfig, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Process one batch of change records.
    ///
    /// Each record is decoded, transformed and published independently.
    /// A decode error aborts the remaining batch; a publish error is
    /// logged and the loop moves on. The summary is reported regardless of
    /// publish outcomes: publishing is best-effort, and the completion
    /// report never waits on it.
    pub fn process_batch(&self, batch: &ChangeBatch) -> Result<BatchSummary> {
        for record in &batch.records {
            self.process_record(record)?;
        }

        Ok(BatchSummary {
            records_received: batch.len(),
        })
    }

    fn process_record(&self, record: &ChangeRecord) -> Result<()> {
        debug!(
            event_name = record.event_name.as_deref().unwrap_or("unknown"),
            "handling change record"
        );

        let old_snapshot = record.old_snapshot()?;
        let new_snapshot = record.new_snapshot()?;

        let identifier = select_identifier(
            &self.config.identifier_field,
            &old_snapshot,
            &new_snapshot,
        );
        let actor = change_initiator(&new_snapshot);

        let revision = build_revision_record(
            actor,
            &self.config.model_name,
            identifier,
            old_snapshot,
            Some(self.config.schema_version.as_str()),
            new_snapshot,
            Some(self.config.schema_version.as_str()),
        );

        let message = build_message(&revision, &self.config)?;
        debug!(topic = %message.topic_arn, "publishing revision record");

        match self.sink.publish(&message) {
            Ok(ack) => {
                debug!(
                    message_id = %ack.message_id,
                    delivered = ack.delivered,
                    "publish acknowledged"
                );
            }
            Err(e) => {
                error!(error = %e, "unable to publish revision record");
            }
        }

        Ok(())
    }
}
