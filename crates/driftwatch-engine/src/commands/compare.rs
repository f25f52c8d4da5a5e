//! Ad-hoc comparison of two report files.

use driftwatch_core::diff::{diff_reports, Diff};
use driftwatch_store::errors::Result;
use driftwatch_store::reports::read_report_file;
use std::path::Path;

/// Diff `current` against `previous`, describing previous -> current.
///
/// # Errors
///
/// Returns `NotFound`/`Io` when a file cannot be read and `InvalidReport`
/// when it is not JSON.
pub fn compare_reports(current: &Path, previous: &Path) -> Result<Diff> {
    let current = read_report_file(current)?;
    let previous = read_report_file(previous)?;
    Ok(diff_reports(&current, &previous))
}
