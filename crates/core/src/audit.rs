//! Snapshot-diff audit change sets.
//!
//! Mutating repository methods capture a JSON snapshot of the row before
//! and after the write and turn the pair into a `{field: {old, new}}`
//! change set via [`diff_states`]. The emission is an explicit step in
//! each mutation, not a hidden framework hook, so it shows up in the
//! method's contract and its tests.

use serde_json::{json, Map, Value};

/// Audit entry actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

/// Diff two entity snapshots into a change set.
///
/// Both arguments must be JSON objects (typically produced by
/// `serde_json::to_value` on the row struct). Fields present in either
/// snapshot whose values differ appear as `{"old": ..., "new": ...}`;
/// unchanged fields are omitted. A field missing from one side diffs
/// against `null`.
pub fn diff_states(old: &Value, new: &Value) -> Map<String, Value> {
    let empty = Map::new();
    let old_map = old.as_object().unwrap_or(&empty);
    let new_map = new.as_object().unwrap_or(&empty);

    let mut changes = Map::new();
    for (field, new_value) in new_map {
        let old_value = old_map.get(field).unwrap_or(&Value::Null);
        if old_value != new_value {
            changes.insert(field.clone(), json!({"old": old_value, "new": new_value}));
        }
    }
    for (field, old_value) in old_map {
        if !new_map.contains_key(field) && !old_value.is_null() {
            changes.insert(field.clone(), json!({"old": old_value, "new": null}));
        }
    }
    changes
}

/// Change set for a freshly created entity: every field old=null.
pub fn create_changes(new: &Value) -> Map<String, Value> {
    diff_states(&Value::Object(Map::new()), new)
}

/// Change set for a deleted entity: every field new=null.
pub fn delete_changes(old: &Value) -> Map<String, Value> {
    let empty = Map::new();
    let old_map = old.as_object().unwrap_or(&empty);
    let mut changes = Map::new();
    for (field, old_value) in old_map {
        changes.insert(field.clone(), json!({"old": old_value, "new": null}));
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_fields_are_omitted() {
        let old = json!({"name": "Fade", "is_active": true});
        let new = json!({"name": "Low Fade", "is_active": true});
        let changes = diff_states(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["name"], json!({"old": "Fade", "new": "Low Fade"}));
    }

    #[test]
    fn added_and_removed_fields_diff_against_null() {
        let old = json!({"a": 1});
        let new = json!({"b": 2});
        let changes = diff_states(&old, &new);
        assert_eq!(changes["a"], json!({"old": 1, "new": null}));
        assert_eq!(changes["b"], json!({"old": null, "new": 2}));
    }

    #[test]
    fn identical_snapshots_produce_no_changes() {
        let state = json!({"key": "export_campaigns", "is_allowed": false});
        assert!(diff_states(&state, &state).is_empty());
    }

    #[test]
    fn create_changes_report_every_field() {
        let new = json!({"key": "edit_client_identity", "is_allowed": true});
        let changes = create_changes(&new);
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes["is_allowed"],
            json!({"old": null, "new": true})
        );
    }

    #[test]
    fn delete_changes_report_every_field() {
        let old = json!({"key": "export_campaigns", "is_allowed": false});
        let changes = delete_changes(&old);
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes["is_allowed"],
            json!({"old": false, "new": null})
        );
    }

    #[test]
    fn action_strings() {
        assert_eq!(AuditAction::Create.as_str(), "create");
        assert_eq!(AuditAction::Update.as_str(), "update");
        assert_eq!(AuditAction::Delete.as_str(), "delete");
    }
}
