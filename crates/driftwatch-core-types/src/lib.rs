//! Core types shared across driftwatch crates
//!
//! This crate provides foundational types used by the error and logging
//! facilities and by the results sinks:
//!
//! - **Correlation types**: RunId identifying one audit run
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
