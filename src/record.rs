//! Revision record assembly.
//!
//! The fallback chains (identifier selection, schema versions) are small
//! pure functions with explicit precedence rules, testable in isolation.
//! The builder itself is a pure assembler; its only effect is sampling the
//! clock, and an explicit-timestamp variant exists for tests.

use crate::types::{RevisionRecord, ScalarValue, Snapshot, Timestamp, ENVELOPE_VERSION};

/// Post-change snapshot field naming the actor behind a change.
pub const INITIATOR_FIELD: &str = "last_updated_by";

/// Select the primary identifier value.
///
/// The post-change snapshot wins unless it is empty (deletion), in which
/// case the pre-change snapshot is consulted. A non-empty post-change
/// snapshot that lacks the field resolves to nothing; there is no silent
/// fallback to the pre-change side.
pub fn select_identifier(field: &str, old: &Snapshot, new: &Snapshot) -> Option<ScalarValue> {
    if new.is_empty() {
        old.get(field).cloned()
    } else {
        new.get(field).cloned()
    }
}

/// Resolve the two schema-version slots.
///
/// An unset or empty version takes the other side's value; when both are
/// set each side keeps its own; when both are unset both slots stay empty.
pub fn resolve_schema_versions(
    old: Option<&str>,
    new: Option<&str>,
) -> (Option<String>, Option<String>) {
    let old = old.filter(|version| !version.is_empty());
    let new = new.filter(|version| !version.is_empty());
    (
        old.or(new).map(str::to_string),
        new.or(old).map(str::to_string),
    )
}

/// Actor recorded on the post-change snapshot; absent on deletion.
pub fn change_initiator(new: &Snapshot) -> Option<ScalarValue> {
    new.get(INITIATOR_FIELD).cloned()
}

/// Assemble a revision record, sampling the wall clock.
#[allow(clippy::too_many_arguments)]
pub fn build_revision_record(
    actor: Option<ScalarValue>,
    model: &str,
    identifier: Option<ScalarValue>,
    old_snapshot: Snapshot,
    old_schema_version: Option<&str>,
    new_snapshot: Snapshot,
    new_schema_version: Option<&str>,
) -> RevisionRecord {
    build_revision_record_at(
        actor,
        model,
        identifier,
        old_snapshot,
        old_schema_version,
        new_snapshot,
        new_schema_version,
        Timestamp::now(),
    )
}

/// Assemble a revision record at an explicit time.
#[allow(clippy::too_many_arguments)]
pub fn build_revision_record_at(
    actor: Option<ScalarValue>,
    model: &str,
    identifier: Option<ScalarValue>,
    old_snapshot: Snapshot,
    old_schema_version: Option<&str>,
    new_snapshot: Snapshot,
    new_schema_version: Option<&str>,
    timestamp: Timestamp,
) -> RevisionRecord {
    let (old_version, new_version) =
        resolve_schema_versions(old_schema_version, new_schema_version);

    RevisionRecord {
        change_initiator: actor,
        model: model.to_string(),
        identifier,
        old_image: old_snapshot,
        old_schema_version: old_version,
        new_image: new_snapshot,
        new_schema_version: new_version,
        envelope_version: ENVELOPE_VERSION.to_string(),
        timestamp,
    }
}
