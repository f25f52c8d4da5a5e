//! driftwatch core - analysis kernel for cloud resource audits
//!
//! This crate provides everything needed to analyse two generations of
//! resource reports without touching the filesystem:
//! - Resource identifiers parsed from report names
//! - A structural JSON diff engine with insert/update/delete operations
//! - A key-value rule language and its matcher
//! - The analytics engine running the diff, population, rule and warning passes
//! - Report store and finding sink traits with in-memory implementations
//! - The error and logging facilities shared by the other crates

pub mod analytics;
pub mod diff;
pub mod errors;
pub mod findings;
pub mod identifier;
pub mod logging_facility;
pub mod report;
pub mod rules;
pub mod store;

// Re-export commonly used types
pub use analytics::{Analysis, Analytics, DiffPass, GenerationIndex};
pub use diff::{diff_reports, Diff};
pub use errors::{DriftError, ExError, ExErrorKind, Result};
pub use findings::Finding;
pub use identifier::ResourceId;
pub use rules::{RuleSet, RuleVerdict};
pub use store::{FindingSink, MemoryReportStore, MemorySink, ReportStore};
