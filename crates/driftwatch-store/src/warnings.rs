//! Warnings file loading
//!
//! The fetch layer records the warnings of a scan as a JSON array of
//! strings. Each becomes one warning finding.

use crate::errors::{io_error, Result};
use driftwatch_core::errors::{ExError, ExErrorKind};
use std::fs;
use std::path::Path;

/// Read a warnings file
///
/// # Errors
///
/// Returns `NotFound`/`Io` when the file cannot be read and `InvalidReport`
/// when it is not an array of strings.
pub fn load_warnings(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|e| io_error("load_warnings", path, e))?;
    serde_json::from_str(&text).map_err(|e| {
        ExError::new(ExErrorKind::InvalidReport)
            .with_op("load_warnings")
            .with_path(path.display().to_string())
            .with_message(format!("expected an array of strings: {}", e))
    })
}
