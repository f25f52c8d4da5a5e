//! Diff computation engine.
//!
//! [`diff`] compares two mappings; [`diff_reports`] first builds the
//! mapping view of arbitrary report roots. [`patch`] applies a diff and is
//! the executable statement of the diff's polarity.

use crate::diff::model::{Diff, Update};
use crate::report::tree_view;
use serde_json::{Map, Value};

/// Object nesting depth below which changed subtrees are replaced whole.
pub const MAX_DEPTH: usize = 128;

/// Compute the operations turning `previous` into `current`.
///
/// Keys equal on both sides are omitted. Keys only in `current` become
/// inserts, keys only in `previous` become deletes. Keys whose values
/// differ become updates; when both values are objects the update is a
/// nested diff, otherwise a whole-value replacement (arrays included).
pub fn diff(current: &Map<String, Value>, previous: &Map<String, Value>) -> Diff {
    diff_at(current, previous, 0)
}

/// Diff two report roots through their mapping view.
///
/// Object roots are compared directly; array and scalar roots are keyed as
/// described in [`crate::report::tree_view`].
pub fn diff_reports(current: &Value, previous: &Value) -> Diff {
    diff(&tree_view(current), &tree_view(previous))
}

fn diff_at(current: &Map<String, Value>, previous: &Map<String, Value>, depth: usize) -> Diff {
    let mut out = Diff::default();

    for (key, new) in current {
        match previous.get(key) {
            None => {
                out.inserts.insert(key.clone(), new.clone());
            }
            Some(old) if old == new => {}
            Some(old) => {
                out.updates
                    .insert(key.clone(), update_for(old, new, depth));
            }
        }
    }

    for (key, old) in previous {
        if !current.contains_key(key) {
            out.deletes.insert(key.clone(), old.clone());
        }
    }

    out
}

fn update_for(old: &Value, new: &Value, depth: usize) -> Update {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) if depth + 1 < MAX_DEPTH => {
            Update::Nested(diff_at(new_map, old_map, depth + 1))
        }
        _ => Update::Replace {
            old: old.clone(),
            new: new.clone(),
        },
    }
}

/// Apply `diff` to `previous`, producing the tree it was computed against.
///
/// For any mappings `c` and `p`, `patch(p, &diff(c, p)) == c`. Operations
/// whose key is missing from `previous` are applied leniently: a nested
/// update on a missing or non-object key starts from an empty object.
pub fn patch(previous: &Map<String, Value>, diff: &Diff) -> Map<String, Value> {
    let mut out = previous.clone();

    for key in diff.deletes.keys() {
        out.remove(key);
    }

    for (key, update) in &diff.updates {
        let next = match update {
            Update::Replace { new, .. } => new.clone(),
            Update::Nested(inner) => {
                let base = match out.get(key) {
                    Some(Value::Object(map)) => map.clone(),
                    _ => Map::new(),
                };
                Value::Object(patch(&base, inner))
            }
        };
        out.insert(key.clone(), next);
    }

    for (key, value) in &diff.inserts {
        out.insert(key.clone(), value.clone());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_identical_trees_produce_empty_diff() {
        let tree = obj(json!({"a": 1, "b": {"c": [1, 2]}}));
        assert!(diff(&tree, &tree).is_empty());
    }

    #[test]
    fn test_insert_update_delete_polarity() {
        let current = obj(json!({"kept": 1, "changed": "new", "added": true}));
        let previous = obj(json!({"kept": 1, "changed": "old", "removed": null}));

        let d = diff(&current, &previous);
        assert_eq!(d.inserts.keys().collect::<Vec<_>>(), vec!["added"]);
        assert_eq!(d.deletes.keys().collect::<Vec<_>>(), vec!["removed"]);
        assert_eq!(
            d.updates["changed"],
            Update::Replace {
                old: json!("old"),
                new: json!("new")
            }
        );
    }

    #[test]
    fn test_nested_objects_recurse() {
        let current = obj(json!({"raw_data": {"id": "2", "kind": "compute#network"}}));
        let previous = obj(json!({"raw_data": {"id": "1", "kind": "compute#network"}}));

        let d = diff(&current, &previous);
        match &d.updates["raw_data"] {
            Update::Nested(inner) => {
                assert_eq!(inner.updates.len(), 1);
                assert!(inner.updates.contains_key("id"));
            }
            other => panic!("expected nested update, got {other:?}"),
        }
    }

    #[test]
    fn test_arrays_are_atomic() {
        let current = obj(json!({"subnetworks": ["https://test3", "https://test2"]}));
        let previous = obj(json!({"subnetworks": ["https://test1", "https://test2"]}));

        let d = diff(&current, &previous);
        assert_eq!(d.change_count(), 1);
        assert!(matches!(d.updates["subnetworks"], Update::Replace { .. }));
    }

    #[test]
    fn test_type_change_is_replacement() {
        let current = obj(json!({"allowed": {"IPProtocol": "tcp"}}));
        let previous = obj(json!({"allowed": "tcp"}));
        assert!(matches!(
            diff(&current, &previous).updates["allowed"],
            Update::Replace { .. }
        ));
    }

    #[test]
    fn test_depth_limit_replaces_deep_subtrees() {
        let mut current = json!("leaf-new");
        let mut previous = json!("leaf-old");
        for _ in 0..(MAX_DEPTH + 10) {
            current = json!({ "n": current });
            previous = json!({ "n": previous });
        }

        let d = diff(&obj(current.clone()), &obj(previous.clone()));
        assert_eq!(d.change_count(), 1);
        assert_eq!(patch(&obj(previous), &d), obj(current));
    }

    #[test]
    fn test_patch_reproduces_current() {
        let current = obj(json!({"a": {"b": 1, "c": [1]}, "d": "x", "new": 0}));
        let previous = obj(json!({"a": {"b": 2, "gone": 1}, "d": "y", "old": 0}));
        let d = diff(&current, &previous);
        assert_eq!(patch(&previous, &d), current);
    }

    #[test]
    fn test_diff_reports_on_named_record_lists() {
        let current = json!([{"name": "fw-a", "sourceRanges": ["0.0.0.0/0"]}]);
        let previous = json!([
            {"name": "fw-a", "sourceRanges": ["10.0.0.0/8"]},
            {"name": "fw-b", "sourceRanges": ["10.0.0.0/8"]}
        ]);

        let d = diff_reports(&current, &previous);
        assert!(d.updates.contains_key("fw-a"));
        assert!(d.deletes.contains_key("fw-b"));
    }
}
