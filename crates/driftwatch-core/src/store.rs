//! Report store and finding sink seams
//!
//! The analytics engine only sees these traits. Filesystem and database
//! implementations live in `driftwatch-store`; the in-memory ones here back
//! the unit and property tests.

use crate::errors::{DriftError, ExError, ExErrorKind, Result};
use crate::findings::Finding;
use serde_json::Value;
use std::collections::BTreeMap;

/// Read access to one report generation
pub trait ReportStore {
    /// Where the generation lives, for log and error context
    fn location(&self) -> &str;

    /// Names of the reports matching a glob `pattern`, sorted
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad pattern and `Io`/`NotFound` when the
    /// generation cannot be listed.
    fn list(&self, pattern: &str) -> Result<Vec<String>>;

    /// Parsed content of the report `name` as returned by [`Self::list`]
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Io` or `InvalidReport`.
    fn read(&self, name: &str) -> Result<Value>;
}

/// Append-only destination for findings
pub trait FindingSink {
    /// Persist one finding after all previously appended ones
    ///
    /// # Errors
    ///
    /// Returns `Io`, `Serialization` or `Persistence` when the finding could
    /// not be written.
    fn append(&mut self, finding: &Finding) -> Result<()>;
}

/// Compile a glob pattern, mapping failures onto the error facility
///
/// # Errors
///
/// Returns `InvalidConfig` when the pattern does not parse.
pub fn compile_pattern(pattern: &str) -> Result<glob::Pattern> {
    glob::Pattern::new(pattern).map_err(|e| {
        ExError::new(ExErrorKind::InvalidConfig)
            .with_op("list_reports")
            .with_message(format!("invalid report pattern '{}': {}", pattern, e))
    })
}

/// In-memory generation keyed by report name
///
/// Content is kept as text so tests can seed unparseable reports.
#[derive(Debug, Clone, Default)]
pub struct MemoryReportStore {
    location: String,
    reports: BTreeMap<String, String>,
}

impl MemoryReportStore {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            reports: BTreeMap::new(),
        }
    }

    /// Add or replace a report
    pub fn insert(&mut self, name: impl Into<String>, data: Value) {
        self.reports.insert(name.into(), data.to_string());
    }

    /// Add or replace a report with raw content
    pub fn insert_raw(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.reports.insert(name.into(), text.into());
    }

    /// Builder form of [`Self::insert`]
    pub fn with(mut self, name: impl Into<String>, data: Value) -> Self {
        self.insert(name, data);
        self
    }
}

impl ReportStore for MemoryReportStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn list(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = compile_pattern(pattern)?;
        Ok(self
            .reports
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect())
    }

    fn read(&self, name: &str) -> Result<Value> {
        let text = self.reports.get(name).ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("read_report")
                .with_path(name)
                .with_message(format!("no report in {}", self.location))
        })?;

        serde_json::from_str(text).map_err(|e| {
            DriftError::UnreadableReport {
                path: name.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Sink collecting findings in a vector
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub findings: Vec<Finding>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FindingSink for MemorySink {
    fn append(&mut self, finding: &Finding) -> Result<()> {
        self.findings.push(finding.clone());
        Ok(())
    }
}
