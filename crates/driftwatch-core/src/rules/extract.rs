//! Extractor registry
//!
//! An extractor pulls the comparable scalar values for a predicate key out
//! of one record. Most resource types store every key at the top level;
//! firewalls nest `IPProtocol` and `ports` inside each element of their
//! `allowed` list.

use serde_json::{Map, Value};

/// Value extraction for one resource type
pub trait Extractor: Send + Sync {
    /// Scalar values of `record` at `key`, in record order
    ///
    /// An empty result means the key is absent or holds nothing comparable.
    fn values<'r>(&self, record: &'r Map<String, Value>, key: &str) -> Vec<&'r Value>;
}

/// Reads the key at the top level of the record
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExtractor;

impl Extractor for DirectExtractor {
    fn values<'r>(&self, record: &'r Map<String, Value>, key: &str) -> Vec<&'r Value> {
        let mut out = Vec::new();
        if let Some(value) = record.get(key) {
            push_scalars(value, &mut out);
        }
        out
    }
}

/// Firewall records: protocol and port keys live in `allowed[*]`
#[derive(Debug, Clone, Copy, Default)]
pub struct FirewallExtractor;

const FIREWALL_ALLOWED: &str = "allowed";
const FIREWALL_NESTED_KEYS: [&str; 2] = ["IPProtocol", "ports"];

impl Extractor for FirewallExtractor {
    fn values<'r>(&self, record: &'r Map<String, Value>, key: &str) -> Vec<&'r Value> {
        if !FIREWALL_NESTED_KEYS.contains(&key) {
            return DirectExtractor.values(record, key);
        }

        let mut out = Vec::new();
        if let Some(Value::Array(entries)) = record.get(FIREWALL_ALLOWED) {
            for entry in entries {
                if let Some(value) = entry.get(key) {
                    push_scalars(value, &mut out);
                }
            }
        }
        out
    }
}

static REGISTRY: &[(&str, &dyn Extractor)] = &[("firewalls", &FirewallExtractor)];

/// Resolve the extractor for a resource type (the rule's `violation_resource`)
pub fn extractor_for(resource_type: &str) -> &'static dyn Extractor {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == resource_type)
        .map(|(_, extractor)| *extractor)
        .unwrap_or(&DirectExtractor)
}

fn push_scalars<'r>(value: &'r Value, out: &mut Vec<&'r Value>) {
    match value {
        Value::Array(items) => out.extend(items.iter().filter(|v| is_scalar(v))),
        Value::Object(_) | Value::Null => {}
        scalar => out.push(scalar),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_direct_extraction() {
        let r = record(json!({"sourceRanges": ["0.0.0.0/0", {"x": 1}, null], "priority": 1000}));
        let extractor = extractor_for("networks");
        assert_eq!(extractor.values(&r, "sourceRanges"), vec![&json!("0.0.0.0/0")]);
        assert_eq!(extractor.values(&r, "priority"), vec![&json!(1000)]);
        assert!(extractor.values(&r, "missing").is_empty());
    }

    #[test]
    fn test_firewall_ports_union_over_allowed_entries() {
        let r = record(json!({
            "name": "fw",
            "allowed": [
                {"IPProtocol": "tcp", "ports": ["22", "80"]},
                {"IPProtocol": "icmp"},
                {"IPProtocol": "udp", "ports": ["53"]}
            ]
        }));
        let extractor = extractor_for("firewalls");
        assert_eq!(
            extractor.values(&r, "ports"),
            vec![&json!("22"), &json!("80"), &json!("53")]
        );
        assert_eq!(
            extractor.values(&r, "IPProtocol"),
            vec![&json!("tcp"), &json!("icmp"), &json!("udp")]
        );
        assert_eq!(extractor.values(&r, "name"), vec![&json!("fw")]);
    }

    #[test]
    fn test_firewall_without_allowed_yields_nothing() {
        let r = record(json!({"denied": [{"IPProtocol": "all"}]}));
        assert!(extractor_for("firewalls").values(&r, "IPProtocol").is_empty());
    }
}
