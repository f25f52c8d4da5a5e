//! Report model and the two views the analysis needs
//!
//! A report is whatever JSON the fetch layer wrote for one
//! `(resource, attribute)` pair. The diff engine needs a mapping and the
//! rule matcher needs individual records; both views are derived here so
//! the rest of the crate never inspects raw report shapes.

use crate::identifier::ResourceId;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Field used to key array elements when building the tree view
const NAME_FIELD: &str = "name";

/// Field holding the records of a list-response shaped report
const ITEMS_FIELD: &str = "items";

/// One report of one generation
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: ResourceId,
    /// Location in the report store the report was read from
    pub path: String,
    pub data: Value,
}

impl Report {
    pub fn new(id: ResourceId, path: impl Into<String>, data: Value) -> Self {
        Self {
            id,
            path: path.into(),
            data,
        }
    }

    /// Mapping view used for diffing
    pub fn tree(&self) -> Map<String, Value> {
        tree_view(&self.data)
    }

    /// Record view used for rule matching
    pub fn records(&self) -> Vec<&Map<String, Value>> {
        records_view(&self.data)
    }
}

/// Build the mapping view of a report root
///
/// - object: used as-is
/// - array: keyed by each element's `name` when every element is an object
///   with a distinct string `name`, otherwise by decimal index
/// - anything else: `{"value": root}`
pub fn tree_view(root: &Value) -> Map<String, Value> {
    match root {
        Value::Object(map) => map.clone(),
        Value::Array(items) => match names_of(items) {
            Some(names) => names
                .into_iter()
                .zip(items.iter().cloned())
                .collect(),
            None => items
                .iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item.clone()))
                .collect(),
        },
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
    }
}

/// Distinct `name` of every element, or `None` if any element lacks one
fn names_of(items: &[Value]) -> Option<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let name = item.get(NAME_FIELD)?.as_str()?;
        if !seen.insert(name) {
            return None;
        }
        names.push(name.to_string());
    }
    Some(names)
}

/// Build the record view of a report root
///
/// - array: every object element
/// - object with an `items` array: every object element of `items`
/// - any other object: the object itself
/// - scalars: no records
pub fn records_view(root: &Value) -> Vec<&Map<String, Value>> {
    match root {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(map) => match map.get(ITEMS_FIELD) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
            _ => vec![map],
        },
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Vec::new(),
    }
}
