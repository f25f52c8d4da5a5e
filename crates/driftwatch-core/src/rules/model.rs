//! Rule model and rule file parsing
//!
//! A rule file is a mapping from rule name to rule body:
//!
//! ```yaml
//! open_to_world:
//!   rule_type: key_value
//!   violation_resource: firewalls
//!   violation:
//!     - sourceRanges: ["0.0.0.0/0"]
//!     - ports: ["22", "3389"]
//! ```
//!
//! Parsing is lenient per rule: a bad rule is recorded as an issue and
//! left out, the others still load. Only a root that is not a mapping
//! fails the whole file.

use crate::errors::DriftError;
use serde::Serialize;
use serde_json::{Map, Value};

/// `rule_type` value of the key-value rule kind
pub const KEY_VALUE: &str = "key_value";

/// Rule kinds this build evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Violated when a record holds any of the listed values at a key
    KeyValue,
}

impl RuleKind {
    /// `rule_type` spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::KeyValue => KEY_VALUE,
        }
    }
}

/// One `(attribute_key, allowed_values)` pair of a rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub key: String,
    pub allowed: Vec<Value>,
}

/// A parsed rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub name: String,
    pub kind: RuleKind,
    /// Attribute kind (`firewalls`, `networks`, ...) the rule inspects
    pub violation_resource: String,
    /// Evaluated in declaration order
    pub predicates: Vec<Predicate>,
}

/// Rules of one rule file plus the rules that could not be loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    /// Valid rules, in rule-name order
    pub rules: Vec<Rule>,
    /// Malformed or unsupported rules, in rule-name order
    pub issues: Vec<DriftError>,
}

impl RuleSet {
    /// Parse a rule document (already decoded from YAML or JSON)
    ///
    /// # Errors
    ///
    /// Returns `DriftError::MalformedRuleFile` when the root is not a mapping.
    pub fn from_value(doc: &Value) -> Result<Self, DriftError> {
        let entries = doc.as_object().ok_or_else(|| DriftError::MalformedRuleFile {
            reason: format!("expected a mapping of rule names, found {}", type_name(doc)),
        })?;

        let mut set = RuleSet::default();
        for (name, body) in entries {
            match parse_rule(name, body) {
                Ok(rule) => set.rules.push(rule),
                Err(issue) => set.issues.push(issue),
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_rule(name: &str, body: &Value) -> Result<Rule, DriftError> {
    let malformed = |reason: String| DriftError::MalformedRule {
        rule: name.to_string(),
        reason,
    };

    let body = body
        .as_object()
        .ok_or_else(|| malformed(format!("expected a mapping, found {}", type_name(body))))?;

    let kind = match body.get("rule_type") {
        Some(Value::String(t)) if t == KEY_VALUE => RuleKind::KeyValue,
        Some(Value::String(t)) => {
            return Err(DriftError::UnknownRuleType {
                rule: name.to_string(),
                rule_type: t.clone(),
            })
        }
        Some(other) => {
            return Err(malformed(format!(
                "rule_type must be a string, found {}",
                type_name(other)
            )))
        }
        None => return Err(malformed("missing rule_type".to_string())),
    };

    let violation_resource = match body.get("violation_resource") {
        Some(Value::String(r)) if !r.is_empty() => r.clone(),
        Some(_) => return Err(malformed("violation_resource must be a non-empty string".into())),
        None => return Err(malformed("missing violation_resource".to_string())),
    };

    let predicates = match body.get("violation") {
        Some(Value::Array(items)) => parse_predicates(items).map_err(malformed)?,
        Some(other) => {
            return Err(malformed(format!(
                "violation must be a list, found {}",
                type_name(other)
            )))
        }
        None => return Err(malformed("missing violation".to_string())),
    };

    if predicates.is_empty() {
        return Err(malformed("violation lists no predicates".to_string()));
    }

    Ok(Rule {
        name: name.to_string(),
        kind,
        violation_resource,
        predicates,
    })
}

fn parse_predicates(items: &[Value]) -> Result<Vec<Predicate>, String> {
    let mut predicates = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let entry: &Map<String, Value> = item.as_object().ok_or_else(|| {
            format!(
                "violation[{}] must be a mapping of key to allowed values, found {}",
                index,
                type_name(item)
            )
        })?;
        for (key, allowed) in entry {
            let allowed = match allowed {
                Value::Array(values) => values.clone(),
                Value::Object(_) | Value::Null => {
                    return Err(format!(
                        "violation[{}].{} must be a value or a list of values",
                        index, key
                    ))
                }
                scalar => vec![scalar.clone()],
            };
            predicates.push(Predicate {
                key: key.clone(),
                allowed,
            });
        }
    }
    Ok(predicates)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
