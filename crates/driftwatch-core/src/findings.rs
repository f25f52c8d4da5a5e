//! Findings emitted by the analytics passes
//!
//! A finding is a flat record tagged by `kind`. Findings are immutable once
//! produced and carry no timestamps, so two runs over the same input
//! serialize to the same bytes.

use crate::diff::Diff;
use crate::identifier::ResourceId;
use crate::rules::PredicateHit;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DIFF_FINDING_NAME: &str = "Difference in Resources";
pub const POPULATION_FINDING_NAME: &str = "Number of Resources has changed";
pub const WARNING_FINDING_NAME: &str = "Warning when running the audit";

/// Direction of a population change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationChange {
    /// Present in the current generation only
    Appeared,
    /// Present in the previous generation only
    Disappeared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    DiffFinding {
        name: String,
        resource: String,
        attribute: String,
        /// `"<Operation> resource: <key>"` lines
        summary: Vec<String>,
        diff: Diff,
        /// Full current report payload
        report: Value,
    },
    PopulationChangeFinding {
        name: String,
        resource: String,
        attribute: String,
        change: PopulationChange,
    },
    RuleViolationFinding {
        name: String,
        /// Owning project or organization
        resource: String,
        /// Attribute kind the rule targets
        attribute: String,
        rule: String,
        record: Value,
        hits: Vec<PredicateHit>,
    },
    WarningFinding {
        name: String,
        warning: String,
    },
}

impl Finding {
    pub fn diff(id: &ResourceId, summary: Vec<String>, diff: Diff, report: Value) -> Self {
        Finding::DiffFinding {
            name: DIFF_FINDING_NAME.to_string(),
            resource: id.resource.clone(),
            attribute: id.attribute.clone(),
            summary,
            diff,
            report,
        }
    }

    pub fn population(id: &ResourceId, change: PopulationChange) -> Self {
        Finding::PopulationChangeFinding {
            name: POPULATION_FINDING_NAME.to_string(),
            resource: id.resource.clone(),
            attribute: id.attribute.clone(),
            change,
        }
    }

    pub fn violation(id: &ResourceId, rule: &str, record: Value, hits: Vec<PredicateHit>) -> Self {
        Finding::RuleViolationFinding {
            name: format!("Violation for {} in {}", id.attribute, id.resource),
            resource: id.resource.clone(),
            attribute: id.attribute.clone(),
            rule: rule.to_string(),
            record,
            hits,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Finding::WarningFinding {
            name: WARNING_FINDING_NAME.to_string(),
            warning: text.into(),
        }
    }

    /// Serialized `kind` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Finding::DiffFinding { .. } => "diff_finding",
            Finding::PopulationChangeFinding { .. } => "population_change_finding",
            Finding::RuleViolationFinding { .. } => "rule_violation_finding",
            Finding::WarningFinding { .. } => "warning_finding",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Finding::DiffFinding { name, .. }
            | Finding::PopulationChangeFinding { name, .. }
            | Finding::RuleViolationFinding { name, .. }
            | Finding::WarningFinding { name, .. } => name,
        }
    }

    /// Implicated identifier, when the finding names one
    pub fn resource_id(&self) -> Option<ResourceId> {
        match self {
            Finding::DiffFinding {
                resource, attribute, ..
            }
            | Finding::PopulationChangeFinding {
                resource, attribute, ..
            }
            | Finding::RuleViolationFinding {
                resource, attribute, ..
            } => Some(ResourceId::new(resource.clone(), attribute.clone())),
            Finding::WarningFinding { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_tag_matches_serialized_form() {
        let id = ResourceId::new("proj-a", "firewalls");
        let findings = vec![
            Finding::diff(&id, vec![], Diff::default(), json!({})),
            Finding::population(&id, PopulationChange::Appeared),
            Finding::violation(&id, "open", json!({}), vec![]),
            Finding::warning("quota exceeded"),
        ];
        for finding in findings {
            let value = serde_json::to_value(&finding).unwrap();
            assert_eq!(value["kind"], json!(finding.kind()));
            assert_eq!(value["name"], json!(finding.name()));
        }
    }

    #[test]
    fn test_violation_name_and_identifier() {
        let id = ResourceId::new("proj-a", "firewalls");
        let finding = Finding::violation(&id, "open", json!({"name": "fw"}), vec![]);
        assert_eq!(finding.name(), "Violation for firewalls in proj-a");
        assert_eq!(finding.resource_id(), Some(id));
        assert_eq!(Finding::warning("w").resource_id(), None);
    }

    #[test]
    fn test_population_finding_round_trips() {
        let finding = Finding::population(
            &ResourceId::new("proj-b", "networks"),
            PopulationChange::Disappeared,
        );
        let text = serde_json::to_string(&finding).unwrap();
        assert!(text.contains("\"change\":\"disappeared\""));
        let back: Finding = serde_json::from_str(&text).unwrap();
        assert_eq!(back, finding);
    }
}
