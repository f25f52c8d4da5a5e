//! Audit run orchestration.
//!
//! ## Pipeline (in order):
//! 1. Open both report generations (missing directory: hard stop)
//! 2. Load the rule file (missing file: hard stop; malformed file: no rules)
//! 3. Load the warnings file, when configured (unusable file: no warnings)
//! 4. Open the sinks (any failure: hard stop, nothing analysed)
//! 5. Run the four analysis passes
//! 6. Append every finding to every sink; write failures are logged and
//!    counted, the run carries on

use driftwatch_core::errors::ExErrorKind;
use driftwatch_core::rules::RuleSet;
use driftwatch_core::store::FindingSink;
use driftwatch_core::{log_op_end, log_op_error, log_op_skip, log_op_start, Analytics};
use driftwatch_core_types::RunId;
use driftwatch_store::errors::Result;
use driftwatch_store::rules_file::load_rule_file;
use driftwatch_store::warnings::load_warnings;
use driftwatch_store::{AuditConfig, FsReportStore, JsonlSink, SqliteSink};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

/// Outcome of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSummary {
    pub run_id: RunId,
    /// Parseable identifiers in the current generation
    pub current_reports: usize,
    /// Current identifiers with a previous counterpart
    pub matched_reports: usize,
    /// Findings per `kind` tag
    pub findings_by_kind: BTreeMap<String, usize>,
    pub findings_total: usize,
    /// Findings every sink accepted
    pub written: usize,
    /// Findings at least one sink rejected
    pub failed: usize,
    pub results_file: PathBuf,
}

impl AuditSummary {
    /// `Results for N resources (M matched) were saved to <results>.`
    pub fn headline(&self) -> String {
        format!(
            "Results for {} resources ({} matched) were saved to {}.",
            self.current_reports,
            self.matched_reports,
            self.results_file.display()
        )
    }
}

/// Run an audit with a fresh run id.
///
/// # Errors
///
/// Returns startup failures only: a missing report directory, a missing
/// rule file or a sink that cannot be opened.
pub fn run_audit(config: &AuditConfig) -> Result<AuditSummary> {
    run_audit_with_id(config, RunId::new())
}

/// Run an audit under a caller-provided run id.
///
/// # Errors
///
/// See [`run_audit`].
pub fn run_audit_with_id(config: &AuditConfig, run_id: RunId) -> Result<AuditSummary> {
    const OP: &str = "run_audit";
    let start = Instant::now();
    let span = tracing::info_span!("audit", run_id = %run_id);
    let _guard = span.enter();
    log_op_start!(OP, run_id = %run_id);

    match execute(config, run_id) {
        Ok(summary) => {
            log_op_end!(
                OP,
                duration_ms = start.elapsed().as_millis() as u64,
                findings_len = summary.findings_total,
                failed = summary.failed
            );
            Ok(summary)
        }
        Err(e) => {
            log_op_error!(OP, e.clone(), duration_ms = start.elapsed().as_millis() as u64);
            Err(e)
        }
    }
}

fn execute(config: &AuditConfig, run_id: RunId) -> Result<AuditSummary> {
    let current = FsReportStore::open(&config.reports_dir)?;
    let previous = FsReportStore::open(&config.previous_reports_dir)?;

    let rules = load_rules(config)?;
    let warnings = load_optional_warnings(config);

    let mut sinks = open_sinks(config, &run_id)?;

    let analytics = Analytics::load_with_pattern(&current, &previous, &config.report_pattern)?;
    let analysis = analytics.run(&rules, &warnings);

    let mut findings_by_kind = BTreeMap::new();
    let mut written = 0;
    let mut failed = 0;
    for finding in &analysis.findings {
        *findings_by_kind
            .entry(finding.kind().to_string())
            .or_insert(0) += 1;

        let mut ok = true;
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.append(finding) {
                log_op_skip!("persist_findings", e, kind = finding.kind());
                ok = false;
            }
        }
        if ok {
            written += 1;
        } else {
            failed += 1;
        }
    }

    Ok(AuditSummary {
        run_id,
        current_reports: analysis.index.current.len(),
        matched_reports: analysis.index.matched.len(),
        findings_by_kind,
        findings_total: analysis.findings.len(),
        written,
        failed,
        results_file: config.results_file.clone(),
    })
}

/// Only a missing rule file stops the run; any other read or parse failure
/// leaves the run with no rules.
fn load_rules(config: &AuditConfig) -> Result<RuleSet> {
    let rules = match load_rule_file(&config.rules_file) {
        Ok(rules) => rules,
        Err(e) if e.kind() == ExErrorKind::NotFound => return Err(e),
        Err(e) => {
            log_op_skip!("load_rules", e);
            RuleSet::default()
        }
    };
    if rules.is_empty() {
        tracing::warn!(
            op = "load_rules",
            path = %config.rules_file.display(),
            "no usable rules, custom rule checks will produce nothing"
        );
    }
    Ok(rules)
}

fn load_optional_warnings(config: &AuditConfig) -> Vec<String> {
    let Some(path) = &config.warnings_file else {
        return Vec::new();
    };
    load_warnings(path).unwrap_or_else(|e| {
        log_op_skip!("load_warnings", e);
        Vec::new()
    })
}

fn open_sinks(config: &AuditConfig, run_id: &RunId) -> Result<Vec<Box<dyn FindingSink>>> {
    let jsonl = JsonlSink::open(&config.results_file)?;
    tracing::debug!(op = "open_sinks", path = %jsonl.path().display(), "results file opened");
    let mut sinks: Vec<Box<dyn FindingSink>> = vec![Box::new(jsonl)];
    if let Some(db) = &config.results_db {
        sinks.push(Box::new(SqliteSink::open(db, run_id.clone())?));
        tracing::debug!(op = "open_sinks", path = %db.display(), "results database opened");
    }
    Ok(sinks)
}
