//! driftwatch engine - orchestration layer
//!
//! Provides the audit run and the report comparison used by the CLI,
//! coordinating the analysis kernel with the filesystem and database
//! collaborators.

pub mod commands;
