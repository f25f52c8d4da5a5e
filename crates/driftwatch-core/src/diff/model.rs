//! Diff output types.
//!
//! The serialized form follows the explicit jsondiff syntax:
//! `{"$insert": {..}, "$update": {..}, "$delete": {..}}` with empty sections
//! omitted. Collections use `BTreeMap` for deterministic serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Edit operations turning the previous tree into the current one.
///
/// An empty `Diff` means "no change" and serializes as `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Diff {
    /// Keys only present in the current tree, with their current value
    #[serde(rename = "$insert", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inserts: BTreeMap<String, Value>,
    /// Keys present in both trees with different values
    #[serde(rename = "$update", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub updates: BTreeMap<String, Update>,
    /// Keys only present in the previous tree, with their previous value
    #[serde(rename = "$delete", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deletes: BTreeMap<String, Value>,
}

/// A changed key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Update {
    /// Whole-value replacement (scalars, arrays, mixed types, depth cut-off)
    Replace { old: Value, new: Value },
    /// Both sides are objects; the change is described key by key
    Nested(Diff),
}

/// Kind of a single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Insert,
    Update,
    Delete,
}

impl OpKind {
    /// Capitalized label used in summary lines
    pub fn label(&self) -> &'static str {
        match self {
            OpKind::Insert => "Insert",
            OpKind::Update => "Update",
            OpKind::Delete => "Delete",
        }
    }
}

/// A leaf operation with its full key path, borrowed from a [`Diff`].
#[derive(Debug, Clone, PartialEq)]
pub struct Operation<'a> {
    pub kind: OpKind,
    pub path: Vec<&'a str>,
    pub old: Option<&'a Value>,
    pub new: Option<&'a Value>,
}

impl Diff {
    /// True when the two trees were equal
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Number of leaf operations, counting through nested updates
    pub fn change_count(&self) -> usize {
        self.inserts.len()
            + self.deletes.len()
            + self
                .updates
                .values()
                .map(|u| match u {
                    Update::Replace { .. } => 1,
                    Update::Nested(inner) => inner.change_count(),
                })
                .sum::<usize>()
    }

    /// Flatten into leaf operations, depth-first, updates before deletes
    /// before inserts at each level, keys sorted within each group.
    pub fn operations(&self) -> Vec<Operation<'_>> {
        let mut out = Vec::new();
        self.collect_operations(&mut Vec::new(), &mut out);
        out
    }

    fn collect_operations<'a>(&'a self, prefix: &mut Vec<&'a str>, out: &mut Vec<Operation<'a>>) {
        for (key, update) in &self.updates {
            prefix.push(key);
            match update {
                Update::Replace { old, new } => out.push(Operation {
                    kind: OpKind::Update,
                    path: prefix.clone(),
                    old: Some(old),
                    new: Some(new),
                }),
                Update::Nested(inner) => inner.collect_operations(prefix, out),
            }
            prefix.pop();
        }
        for (key, old) in &self.deletes {
            let mut path = prefix.clone();
            path.push(key);
            out.push(Operation {
                kind: OpKind::Delete,
                path,
                old: Some(old),
                new: None,
            });
        }
        for (key, new) in &self.inserts {
            let mut path = prefix.clone();
            path.push(key);
            out.push(Operation {
                kind: OpKind::Insert,
                path,
                old: None,
                new: Some(new),
            });
        }
    }
}
