//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! the analysis kernel and the persistence layer.

pub mod audit;
pub mod compare;
