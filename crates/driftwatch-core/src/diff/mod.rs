//! Structural JSON diff engine.
//!
//! Compares the current and previous version of a report and produces a
//! tree of insert/update/delete operations.
//!
//! ## Entry point
//!
//! ```
//! use driftwatch_core::diff::{diff_reports, summary_lines};
//! use serde_json::json;
//!
//! let current = json!({"sourceRanges": ["0.0.0.0/0"]});
//! let previous = json!({"sourceRanges": ["10.0.0.0/8"]});
//! let diff = diff_reports(&current, &previous);
//! assert_eq!(summary_lines(&diff), vec!["Update resource: sourceRanges"]);
//! ```
//!
//! ## Guarantees
//!
//! - **Polarity**: `diff(current, previous)` describes how to turn `previous`
//!   into `current`; `patch(previous, &diff)` reproduces `current`.
//! - **Emptiness**: identical inputs produce the empty diff, serialized as `{}`.
//! - **Determinism**: keys are kept in sorted maps, so equal inputs produce
//!   byte-identical serialized output.
//! - **Arrays are atomic**: any element change updates the whole array.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{diff, diff_reports, patch, MAX_DEPTH};
pub use human_summary::{render_human_summary, summary_lines};
pub use model::{Diff, OpKind, Operation, Update};
