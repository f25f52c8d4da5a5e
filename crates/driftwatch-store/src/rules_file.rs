//! Rule file loading
//!
//! Rule files are YAML (JSON is accepted as YAML). The document is decoded
//! into a JSON value and handed to [`RuleSet::from_value`]; rules that fail
//! to parse are logged here and left out of the returned set.

use crate::errors::{io_error, Result};
use driftwatch_core::errors::{DriftError, ExError};
use driftwatch_core::log_op_skip;
use driftwatch_core::rules::RuleSet;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read and parse a rule file
///
/// # Errors
///
/// Returns `NotFound`/`Io` when the file cannot be read and
/// `MalformedRuleFile` when it is not a mapping of rules.
pub fn load_rule_file(path: &Path) -> Result<RuleSet> {
    let text = fs::read_to_string(path).map_err(|e| io_error("load_rules", path, e))?;
    let rules = parse_rules_str(&text).map_err(|e| e.with_path(path.display().to_string()))?;

    for issue in &rules.issues {
        log_op_skip!("load_rules", issue.clone(), path = %path.display());
    }
    tracing::info!(
        op = "load_rules",
        path = %path.display(),
        rules_len = rules.rules.len(),
        issues_len = rules.issues.len(),
        "rule file loaded"
    );

    Ok(rules)
}

/// Parse rule file content
///
/// # Errors
///
/// Returns `MalformedRuleFile` on YAML syntax errors or a non-mapping root.
pub fn parse_rules_str(text: &str) -> Result<RuleSet> {
    let doc: Value = serde_yaml::from_str(text).map_err(|e| {
        ExError::from(DriftError::MalformedRuleFile {
            reason: e.to_string(),
        })
    })?;
    RuleSet::from_value(&doc).map_err(ExError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_core::errors::ExErrorKind;
    use tempfile::TempDir;

    const RULES: &str = r#"
open_ssh:
  rule_type: key_value
  violation_resource: firewalls
  violation:
    - sourceRanges: ["0.0.0.0/0"]
    - ports: ["22"]
auto_subnets:
  rule_type: key_value
  violation_resource: networks
  violation:
    - autoCreateSubnetworks: true
legacy:
  rule_type: regex
  violation_resource: firewalls
  violation:
    - name: ".*"
"#;

    #[test]
    fn test_parse_yaml_rules_in_name_order() {
        let rules = parse_rules_str(RULES).unwrap();
        let names: Vec<_> = rules.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["auto_subnets", "open_ssh"]);
        assert_eq!(rules.issues.len(), 1);
    }

    #[test]
    fn test_json_rule_file_is_accepted() {
        let json = r#"{"r": {"rule_type": "key_value", "violation_resource": "firewalls",
                      "violation": [{"IPProtocol": ["tcp"]}]}}"#;
        assert_eq!(parse_rules_str(json).unwrap().rules.len(), 1);
    }

    #[test]
    fn test_malformed_file_errors() {
        let err = parse_rules_str("- just\n- a list\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MalformedRuleFile);

        let err = parse_rules_str("key: [unclosed").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MalformedRuleFile);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_rule_file(&dir.path().join("rules.yaml")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.yaml");
        fs::write(&path, RULES).unwrap();
        assert_eq!(load_rule_file(&path).unwrap().rules.len(), 2);
    }
}
