//! End-to-end pipeline tests: changefeed batch in, topic messages out.

use revision_notifier::config::split_fields;
use revision_notifier::{
    ChangeBatch, DeliveryFilter, InProcessTopic, Notifier, NotifierConfig, RevisionRecord,
    ScalarValue,
};
use serde_json::json;
use std::time::Duration;

const ARN: &str = "arn:aws:sns:us-east-1:123:revisions";

fn test_config(additional: Option<&str>) -> NotifierConfig {
    NotifierConfig {
        topic_arn: ARN.to_string(),
        model_name: "Widget".to_string(),
        schema_version: "2".to_string(),
        identifier_field: "id".to_string(),
        additional_identifier_fields: split_fields(additional),
    }
}

fn make_batch(records: serde_json::Value) -> ChangeBatch {
    let _ = tracing_subscriber::fmt::try_init();
    serde_json::from_value(json!({ "Records": records })).unwrap()
}

// --- Scenario Tests ---

#[test]
fn test_insert_resolves_identifier_initiator_and_versions() {
    let topic = InProcessTopic::new(ARN);
    let subscriber = topic.subscribe(DeliveryFilter::all());
    let notifier = Notifier::new(test_config(None), topic);

    let batch = make_batch(json!([{
        "EventName": "INSERT",
        "NewImage": {
            "id": {"S": "42"},
            "owner": {"S": "u1"},
            "last_updated_by": {"S": "u1"},
            "name": {"S": "widget"}
        }
    }]));

    let summary = notifier.process_batch(&batch).unwrap();
    assert_eq!(summary.to_string(), "Successfully processed 1 records.");

    let message = subscriber.recv_timeout(Duration::from_millis(100)).unwrap();
    let record: RevisionRecord = serde_json::from_str(&message.message).unwrap();

    assert_eq!(record.identifier, Some(ScalarValue::from("42")));
    assert_eq!(record.change_initiator, Some(ScalarValue::from("u1")));
    assert_eq!(record.model, "Widget");
    assert_eq!(record.old_schema_version.as_deref(), Some("2"));
    assert_eq!(record.new_schema_version.as_deref(), Some("2"));
    assert_eq!(record.envelope_version, "1.0");
    assert!(record.old_image.is_empty());
    assert_eq!(record.new_image.get("name"), Some(&ScalarValue::from("widget")));
    assert!(record.timestamp.0 > 0.0);
}

#[test]
fn test_deletion_falls_back_to_pre_change_identifier() {
    let topic = InProcessTopic::new(ARN);
    let subscriber = topic.subscribe(DeliveryFilter::all());
    let notifier = Notifier::new(test_config(None), topic);

    let batch = make_batch(json!([{
        "EventName": "REMOVE",
        "OldImage": {"id": {"S": "7"}}
    }]));

    notifier.process_batch(&batch).unwrap();

    let message = subscriber.recv_timeout(Duration::from_millis(100)).unwrap();
    let record: RevisionRecord = serde_json::from_str(&message.message).unwrap();

    assert_eq!(record.identifier, Some(ScalarValue::from("7")));
    assert!(record.new_image.is_empty());
    assert_eq!(record.old_image.get("id"), Some(&ScalarValue::from("7")));
    assert_eq!(record.change_initiator, None);
}

#[test]
fn test_additional_identifier_fields_become_attributes() {
    let topic = InProcessTopic::new(ARN);
    let subscriber = topic.subscribe(DeliveryFilter::all());
    let notifier = Notifier::new(test_config(Some("owner:name")), topic);

    let batch = make_batch(json!([{
        "NewImage": {
            "id": {"S": "1"},
            "owner": {"S": "u2"},
            "name": {"S": "w"}
        }
    }]));

    notifier.process_batch(&batch).unwrap();

    let message = subscriber.recv_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(message.message_attributes["owner"].string_value, "u2");
    assert_eq!(message.message_attributes["name"].string_value, "w");
}

#[test]
fn test_no_additional_fields_means_exactly_four_attributes() {
    let topic = InProcessTopic::new(ARN);
    let subscriber = topic.subscribe(DeliveryFilter::all());
    let notifier = Notifier::new(test_config(None), topic);

    let batch = make_batch(json!([{
        "NewImage": {"id": {"S": "1"}, "owner": {"S": "u2"}}
    }]));

    notifier.process_batch(&batch).unwrap();

    let message = subscriber.recv_timeout(Duration::from_millis(100)).unwrap();
    let mut keys: Vec<&str> = message
        .message_attributes
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "envelope_version",
            "model",
            "new_schema_version",
            "old_schema_version"
        ]
    );
}

#[test]
fn test_message_body_roundtrips_to_revision_record() {
    let topic = InProcessTopic::new(ARN);
    let subscriber = topic.subscribe(DeliveryFilter::all());
    let notifier = Notifier::new(test_config(None), topic);

    let batch = make_batch(json!([{
        "OldImage": {"id": {"S": "9"}, "count": {"N": "2"}},
        "NewImage": {"id": {"S": "9"}, "count": {"N": "3.5"}, "active": {"BOOL": true}}
    }]));

    notifier.process_batch(&batch).unwrap();

    let message = subscriber.recv_timeout(Duration::from_millis(100)).unwrap();
    let record: RevisionRecord = serde_json::from_str(&message.message).unwrap();
    let reserialized = serde_json::to_string(&record).unwrap();
    let again: RevisionRecord = serde_json::from_str(&reserialized).unwrap();

    assert_eq!(again, record);
    assert_eq!(record.new_image.get("count"), Some(&ScalarValue::from(3.5)));
    assert_eq!(record.new_image.get("active"), Some(&ScalarValue::Bool(true)));
}

// --- Completion Contract ---

#[test]
fn test_batch_summary_ignores_publish_failures() {
    // Body ceiling low enough that the middle record's message is rejected
    // by the sink while the other two go through. The completion report is
    // intentionally not contingent on publish outcomes.
    let topic = InProcessTopic::with_limits(ARN, 10, 400);
    let subscriber = topic.subscribe(DeliveryFilter::all());
    let notifier = Notifier::new(test_config(None), topic);

    let oversized = "x".repeat(500);
    let batch = make_batch(json!([
        {"NewImage": {"id": {"S": "1"}}},
        {"NewImage": {"id": {"S": "2"}, "notes": {"S": oversized}}},
        {"NewImage": {"id": {"S": "3"}}}
    ]));

    let summary = notifier.process_batch(&batch).unwrap();
    assert_eq!(summary.to_string(), "Successfully processed 3 records.");

    // Only the small records were delivered.
    let first = subscriber.recv_timeout(Duration::from_millis(100)).unwrap();
    let second = subscriber.recv_timeout(Duration::from_millis(100)).unwrap();
    assert!(subscriber.try_recv().is_err());

    let ids: Vec<RevisionRecord> = [first, second]
        .iter()
        .map(|m| serde_json::from_str(&m.message).unwrap())
        .collect();
    assert_eq!(ids[0].identifier, Some(ScalarValue::from("1")));
    assert_eq!(ids[1].identifier, Some(ScalarValue::from("3")));
}

// --- Subscriber Routing ---

#[test]
fn test_subscribers_filter_on_routing_attributes() {
    let topic = InProcessTopic::new(ARN);
    let widgets = topic.subscribe(
        DeliveryFilter::all().attribute("model", vec!["Widget".to_string()]),
    );
    let gadgets = topic.subscribe(
        DeliveryFilter::all().attribute("model", vec!["Gadget".to_string()]),
    );
    let notifier = Notifier::new(test_config(None), topic);

    let batch = make_batch(json!([{
        "NewImage": {"id": {"S": "1"}}
    }]));
    notifier.process_batch(&batch).unwrap();

    assert!(widgets.recv_timeout(Duration::from_millis(100)).is_ok());
    assert!(gadgets.try_recv().is_err());
}

#[test]
fn test_routing_on_additional_identifier_attribute() {
    let topic = InProcessTopic::new(ARN);
    let mine = topic.subscribe(
        DeliveryFilter::all().attribute("owner", vec!["u2".to_string()]),
    );
    let theirs = topic.subscribe(
        DeliveryFilter::all().attribute("owner", vec!["u9".to_string()]),
    );
    let notifier = Notifier::new(test_config(Some("owner")), topic);

    let batch = make_batch(json!([{
        "NewImage": {"id": {"S": "1"}, "owner": {"S": "u2"}}
    }]));
    notifier.process_batch(&batch).unwrap();

    assert!(mine.recv_timeout(Duration::from_millis(100)).is_ok());
    assert!(theirs.try_recv().is_err());
}
