//! Rule evaluation against a single record

use crate::rules::extract::{extractor_for, Extractor};
use crate::rules::model::{Predicate, Rule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A predicate that fired, with the record values that matched it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateHit {
    pub key: String,
    pub values: Vec<Value>,
}

/// Outcome of evaluating one rule against one record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleVerdict {
    /// Hitting predicates, in predicate order
    pub hits: Vec<PredicateHit>,
}

impl RuleVerdict {
    /// OR across predicates
    pub fn violated(&self) -> bool {
        !self.hits.is_empty()
    }
}

/// Evaluate `rule` against `record`, resolving the extractor from the rule
pub fn evaluate(rule: &Rule, record: &Map<String, Value>) -> RuleVerdict {
    evaluate_with(
        extractor_for(&rule.violation_resource),
        &rule.predicates,
        record,
    )
}

/// Evaluate predicates with an already resolved extractor
pub fn evaluate_with(
    extractor: &dyn Extractor,
    predicates: &[Predicate],
    record: &Map<String, Value>,
) -> RuleVerdict {
    let hits = predicates
        .iter()
        .filter_map(|predicate| {
            let allowed: BTreeSet<String> = predicate
                .allowed
                .iter()
                .filter_map(canonical_text)
                .collect();

            let mut seen = BTreeSet::new();
            let values: Vec<Value> = extractor
                .values(record, &predicate.key)
                .into_iter()
                .filter(|value| {
                    canonical_text(value)
                        .map(|text| allowed.contains(&text) && seen.insert(text))
                        .unwrap_or(false)
                })
                .cloned()
                .collect();

            (!values.is_empty()).then(|| PredicateHit {
                key: predicate.key.clone(),
                values,
            })
        })
        .collect();

    RuleVerdict { hits }
}

/// Text a scalar compares by: `"22"` and `22` are the same value
fn canonical_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
