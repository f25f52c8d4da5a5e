//! driftwatch store - filesystem and database collaborators of the analysis
//!
//! Provides:
//! - `FsReportStore`: a report generation on disk, listed by glob
//! - Rule file, warnings file and audit configuration loaders (YAML/JSON)
//! - Finding sinks: append-only JSON lines and SQLite with embedded migrations

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod reports;
pub mod rules_file;
pub mod sink;
pub mod warnings;

// Re-export key types
pub use config::AuditConfig;
pub use errors::Result;
pub use reports::FsReportStore;
pub use sink::{JsonlSink, SqliteSink};
