//! Analytics engine
//!
//! Four independent passes over a pair of report generations:
//!
//! 1. [`Analytics::check_diff_projects`]: structural diff of every current
//!    report against its previous counterpart
//! 2. [`Analytics::check_number_projects`]: reports that appeared or
//!    disappeared between generations
//! 3. [`Analytics::check_custom_rules`]: key-value rule violations in the
//!    current generation
//! 4. [`Analytics::check_warnings`]: fetch-layer warnings turned into findings
//!
//! No pass returns an error. Unusable reports and identifiers are logged
//! with their error code and skipped.

use crate::diff::{diff, summary_lines};
use crate::errors::Result;
use crate::findings::{Finding, PopulationChange};
use crate::identifier::ResourceId;
use crate::report::Report;
use crate::rules::{evaluate_with, extractor_for, RuleSet};
use crate::store::ReportStore;
use crate::{log_op_end, log_op_skip, log_op_start};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Default report listing pattern
pub const REPORT_PATTERN: &str = "*.json";

/// Identifier sets produced by the diff pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationIndex {
    /// Every parseable identifier of the current generation
    pub current: BTreeSet<ResourceId>,
    /// Every parseable identifier of the previous generation
    pub previous: BTreeSet<ResourceId>,
    /// Current identifiers that have a previous counterpart
    pub matched: BTreeSet<ResourceId>,
}

impl GenerationIndex {
    /// Symmetric difference of current and previous, in identifier order
    pub fn population_changes(&self) -> Vec<(&ResourceId, PopulationChange)> {
        self.current
            .symmetric_difference(&self.previous)
            .map(|id| {
                let change = if self.current.contains(id) {
                    PopulationChange::Appeared
                } else {
                    PopulationChange::Disappeared
                };
                (id, change)
            })
            .collect()
    }
}

/// Result of the diff pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffPass {
    pub findings: Vec<Finding>,
    pub index: GenerationIndex,
}

/// All four passes, concatenated in pass order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub findings: Vec<Finding>,
    pub index: GenerationIndex,
}

/// Analytics engine over a current and a previous report generation
pub struct Analytics<'s> {
    current: &'s dyn ReportStore,
    previous: &'s dyn ReportStore,
    /// Current report names in listing order
    current_names: Vec<String>,
    /// Previous report name per identifier
    previous_by_id: BTreeMap<ResourceId, String>,
}

impl<'s> Analytics<'s> {
    /// List both generations with the default `*.json` pattern
    ///
    /// # Errors
    ///
    /// Returns the store error when either generation cannot be listed.
    pub fn load(current: &'s dyn ReportStore, previous: &'s dyn ReportStore) -> Result<Self> {
        Self::load_with_pattern(current, previous, REPORT_PATTERN)
    }

    /// List both generations with a custom glob pattern
    ///
    /// Previous reports with a malformed name are logged and left out of the
    /// previous identifier set.
    ///
    /// # Errors
    ///
    /// Returns the store error when either generation cannot be listed.
    pub fn load_with_pattern(
        current: &'s dyn ReportStore,
        previous: &'s dyn ReportStore,
        pattern: &str,
    ) -> Result<Self> {
        let current_names = current
            .list(pattern)
            .map_err(|e| e.with_op("load_analytics"))?;
        let previous_names = previous
            .list(pattern)
            .map_err(|e| e.with_op("load_analytics"))?;

        let mut previous_by_id = BTreeMap::new();
        for name in previous_names {
            match ResourceId::parse(&name) {
                Ok(id) => {
                    if previous_by_id.contains_key(&id) {
                        tracing::warn!(
                            op = "load_analytics",
                            path = %name,
                            "duplicate identifier in previous generation, keeping the first report"
                        );
                        continue;
                    }
                    previous_by_id.insert(id, name);
                }
                Err(e) => log_op_skip!("load_analytics", e),
            }
        }

        tracing::debug!(
            op = "load_analytics",
            current_reports = current_names.len(),
            previous_reports = previous_by_id.len(),
            "generations listed"
        );

        Ok(Self {
            current,
            previous,
            current_names,
            previous_by_id,
        })
    }

    /// Current report names with their parsed identifiers
    ///
    /// Malformed names are skipped; `log` controls whether they are reported
    /// again (the diff pass reports them, later passes stay quiet).
    fn current_ids(&self, op: &str, log: bool) -> Vec<(ResourceId, &str)> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for name in &self.current_names {
            match ResourceId::parse(name) {
                Ok(id) => {
                    if seen.insert(id.clone()) {
                        out.push((id, name.as_str()));
                    } else if log {
                        tracing::warn!(
                            op,
                            path = %name,
                            "duplicate identifier in current generation, keeping the first report"
                        );
                    }
                }
                Err(e) => {
                    if log {
                        log_op_skip!(op, e);
                    }
                }
            }
        }
        out
    }

    fn read(store: &dyn ReportStore, id: &ResourceId, name: &str, op: &str) -> Option<Report> {
        match store.read(name) {
            Ok(data) => Some(Report::new(id.clone(), name, data)),
            Err(e) => {
                log_op_skip!(op, e, store = store.location());
                None
            }
        }
    }

    /// Diff every current report against its previous counterpart
    ///
    /// Reports without a counterpart produce nothing here; they surface in
    /// [`Self::check_number_projects`].
    pub fn check_diff_projects(&self) -> DiffPass {
        const OP: &str = "check_diff_projects";
        let start = Instant::now();
        log_op_start!(OP, reports_len = self.current_names.len());

        let mut pass = DiffPass {
            findings: Vec::new(),
            index: GenerationIndex {
                previous: self.previous_by_id.keys().cloned().collect(),
                ..GenerationIndex::default()
            },
        };

        for (id, name) in self.current_ids(OP, true) {
            pass.index.current.insert(id.clone());

            let Some(previous_name) = self.previous_by_id.get(&id) else {
                tracing::debug!(op = OP, resource = %id.resource, attribute = %id.attribute, "no previous report");
                continue;
            };

            let Some(current) = Self::read(self.current, &id, name, OP) else {
                continue;
            };
            let Some(previous) = Self::read(self.previous, &id, previous_name, OP) else {
                continue;
            };
            pass.index.matched.insert(id.clone());

            let diff = diff(&current.tree(), &previous.tree());
            if diff.is_empty() {
                continue;
            }

            tracing::info!(
                op = OP,
                resource = %id.resource,
                attribute = %id.attribute,
                path = %current.path,
                changes = diff.change_count(),
                "Found diff for {} in {}",
                id.attribute,
                id.resource
            );
            let summary = summary_lines(&diff);
            pass.findings
                .push(Finding::diff(&id, summary, diff, current.data));
        }

        log_op_end!(
            OP,
            duration_ms = start.elapsed().as_millis() as u64,
            findings_len = pass.findings.len()
        );
        pass
    }

    /// One finding per identifier present in exactly one generation
    pub fn check_number_projects(&self, index: &GenerationIndex) -> Vec<Finding> {
        const OP: &str = "check_number_projects";
        let start = Instant::now();
        log_op_start!(OP, reports_len = index.current.len());

        let findings: Vec<Finding> = index
            .population_changes()
            .into_iter()
            .map(|(id, change)| Finding::population(id, change))
            .collect();

        if !findings.is_empty() {
            tracing::info!(
                op = OP,
                "Before there were {} resources being reported, now there are {}.",
                index.previous.len(),
                index.current.len()
            );
        }

        log_op_end!(
            OP,
            duration_ms = start.elapsed().as_millis() as u64,
            findings_len = findings.len()
        );
        findings
    }

    /// Evaluate every rule against the records of its target attribute kind
    pub fn check_custom_rules(&self, rules: &RuleSet) -> Vec<Finding> {
        const OP: &str = "check_custom_rules";
        let start = Instant::now();
        log_op_start!(OP, rules_len = rules.rules.len());

        let reports = self.current_ids(OP, false);
        // Each report is read at most once, however many rules target it
        let mut loaded: BTreeMap<&ResourceId, Option<Report>> = BTreeMap::new();
        let mut findings = Vec::new();

        for rule in &rules.rules {
            let extractor = extractor_for(&rule.violation_resource);

            for (id, name) in reports
                .iter()
                .filter(|(id, _)| id.attribute == rule.violation_resource)
            {
                let Some(report) = loaded
                    .entry(id)
                    .or_insert_with(|| Self::read(self.current, id, name, OP))
                else {
                    continue;
                };
                for record in report.records() {
                    let verdict = evaluate_with(extractor, &rule.predicates, record);
                    if verdict.violated() {
                        tracing::info!(
                            op = OP,
                            rule = %rule.name,
                            resource = %id.resource,
                            attribute = %id.attribute,
                            "rule violated"
                        );
                        findings.push(Finding::violation(
                            id,
                            &rule.name,
                            Value::Object(record.clone()),
                            verdict.hits,
                        ));
                    }
                }
            }
        }

        log_op_end!(
            OP,
            duration_ms = start.elapsed().as_millis() as u64,
            findings_len = findings.len()
        );
        findings
    }

    /// One finding per warning, verbatim and in order
    pub fn check_warnings(&self, warnings: &[String]) -> Vec<Finding> {
        const OP: &str = "check_warnings";
        let start = Instant::now();
        log_op_start!(OP);

        let findings: Vec<Finding> = warnings.iter().map(Finding::warning).collect();

        log_op_end!(
            OP,
            duration_ms = start.elapsed().as_millis() as u64,
            findings_len = findings.len()
        );
        findings
    }

    /// Run the four passes and concatenate their findings
    pub fn run(&self, rules: &RuleSet, warnings: &[String]) -> Analysis {
        let DiffPass {
            mut findings,
            index,
        } = self.check_diff_projects();
        findings.extend(self.check_number_projects(&index));
        findings.extend(self.check_custom_rules(rules));
        findings.extend(self.check_warnings(warnings));
        Analysis { findings, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryReportStore;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_missing_counterpart_is_not_a_diff() {
        let current = MemoryReportStore::new("current").with("p1@networks.json", json!({"a": 1}));
        let previous = MemoryReportStore::new("previous");

        let analytics = Analytics::load(&current, &previous).unwrap();
        let pass = analytics.check_diff_projects();
        assert!(pass.findings.is_empty());
        assert!(pass.index.matched.is_empty());
        assert_eq!(pass.index.current.len(), 1);
    }

    #[test]
    fn test_malformed_names_are_excluded() {
        let current = MemoryReportStore::new("current")
            .with("no-separator.json", json!({}))
            .with("a@b@c.json", json!({}))
            .with("p1@networks.json", json!({}));
        let previous = MemoryReportStore::new("previous").with("p1@networks.json", json!({}));

        let analytics = Analytics::load(&current, &previous).unwrap();
        let pass = analytics.check_diff_projects();
        assert_eq!(
            pass.index.current.iter().collect::<Vec<_>>(),
            vec![&ResourceId::new("p1", "networks")]
        );
        assert!(analytics.check_number_projects(&pass.index).is_empty());
    }

    #[test]
    fn test_unreadable_report_is_skipped() {
        let mut current = MemoryReportStore::new("current");
        current.insert_raw("p1@networks.json", "{broken");
        let previous = MemoryReportStore::new("previous").with("p1@networks.json", json!({"a": 1}));

        let analytics = Analytics::load(&current, &previous).unwrap();
        let pass = analytics.check_diff_projects();
        assert!(pass.findings.is_empty());
        assert!(pass.index.matched.is_empty());
        assert_eq!(pass.index.current.len(), 1);
    }

    #[test]
    fn test_unreadable_previous_report_is_not_matched() {
        let current = MemoryReportStore::new("current").with("p1@networks.json", json!({"a": 1}));
        let mut previous = MemoryReportStore::new("previous");
        previous.insert_raw("p1@networks.json", "{broken");

        let analytics = Analytics::load(&current, &previous).unwrap();
        let pass = analytics.check_diff_projects();
        assert!(pass.findings.is_empty());
        assert!(pass.index.matched.is_empty());
        assert!(analytics.check_number_projects(&pass.index).is_empty());
    }

    #[test]
    fn test_population_uses_full_previous_set() {
        let current = MemoryReportStore::new("current").with("x@networks.json", json!({}));
        let previous = MemoryReportStore::new("previous").with("z@networks.json", json!({}));

        let analytics = Analytics::load(&current, &previous).unwrap();
        let pass = analytics.check_diff_projects();
        let findings = analytics.check_number_projects(&pass.index);
        assert_eq!(
            findings,
            vec![
                Finding::population(&ResourceId::new("x", "networks"), PopulationChange::Appeared),
                Finding::population(
                    &ResourceId::new("z", "networks"),
                    PopulationChange::Disappeared
                ),
            ]
        );
    }

    #[test]
    fn test_rules_only_inspect_target_attribute() {
        let open = json!([{"name": "fw", "sourceRanges": ["0.0.0.0/0"]}]);
        let current = MemoryReportStore::new("current")
            .with("p1@firewalls.json", open.clone())
            .with("p1@networks.json", open);
        let previous = MemoryReportStore::new("previous");
        let rules = RuleSet::from_value(&json!({
            "open": {
                "rule_type": "key_value",
                "violation_resource": "firewalls",
                "violation": [{"sourceRanges": ["0.0.0.0/0"]}]
            }
        }))
        .unwrap();

        let analytics = Analytics::load(&current, &previous).unwrap();
        let findings = analytics.check_custom_rules(&rules);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].resource_id(),
            Some(ResourceId::new("p1", "firewalls"))
        );
    }

    /// Store counting reads per report name
    struct CountingStore {
        inner: MemoryReportStore,
        reads: RefCell<BTreeMap<String, usize>>,
    }

    impl ReportStore for CountingStore {
        fn location(&self) -> &str {
            self.inner.location()
        }

        fn list(&self, pattern: &str) -> Result<Vec<String>> {
            self.inner.list(pattern)
        }

        fn read(&self, name: &str) -> Result<Value> {
            *self.reads.borrow_mut().entry(name.to_string()).or_insert(0) += 1;
            self.inner.read(name)
        }
    }

    #[test]
    fn test_rules_read_each_report_once() {
        let mut inner = MemoryReportStore::new("current")
            .with("p1@firewalls.json", json!([{"name": "fw", "sourceRanges": ["0.0.0.0/0"]}]));
        inner.insert_raw("p2@firewalls.json", "{broken");
        let current = CountingStore {
            inner,
            reads: RefCell::new(BTreeMap::new()),
        };
        let previous = MemoryReportStore::new("previous");
        let rules = RuleSet::from_value(&json!({
            "open": {
                "rule_type": "key_value",
                "violation_resource": "firewalls",
                "violation": [{"sourceRanges": ["0.0.0.0/0"]}]
            },
            "named": {
                "rule_type": "key_value",
                "violation_resource": "firewalls",
                "violation": [{"name": ["fw"]}]
            }
        }))
        .unwrap();

        let analytics = Analytics::load(&current, &previous).unwrap();
        let findings = analytics.check_custom_rules(&rules);
        assert_eq!(findings.len(), 2);
        assert_eq!(
            *current.reads.borrow(),
            BTreeMap::from([
                ("p1@firewalls.json".to_string(), 1),
                ("p2@firewalls.json".to_string(), 1),
            ])
        );
    }

    #[test]
    fn test_warnings_are_verbatim_and_not_deduplicated() {
        let store = MemoryReportStore::new("empty");
        let analytics = Analytics::load(&store, &store).unwrap();
        let warnings = vec!["quota".to_string(), "quota".to_string()];
        assert_eq!(
            analytics.check_warnings(&warnings),
            vec![Finding::warning("quota"), Finding::warning("quota")]
        );
    }

    #[test]
    fn test_run_concatenates_in_pass_order() {
        let current = MemoryReportStore::new("current")
            .with("p1@networks.json", json!({"a": 2}))
            .with("p2@networks.json", json!({}));
        let previous = MemoryReportStore::new("previous").with("p1@networks.json", json!({"a": 1}));

        let analytics = Analytics::load(&current, &previous).unwrap();
        let analysis = analytics.run(&RuleSet::default(), &["w".to_string()]);
        let kinds: Vec<_> = analysis.findings.iter().map(Finding::kind).collect();
        assert_eq!(
            kinds,
            vec!["diff_finding", "population_change_finding", "warning_finding"]
        );
        assert_eq!(analysis.index.matched.len(), 1);
    }
}
