//! Report generations on disk
//!
//! A generation is a flat directory of `<resource>@<attribute>.json` files
//! written by the fetch layer. Reports are listed by glob and read whole.

use crate::errors::{io_error, Result};
use driftwatch_core::errors::{DriftError, ExError, ExErrorKind};
use driftwatch_core::store::{compile_pattern, ReportStore};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-backed [`ReportStore`] rooted at one directory
#[derive(Debug, Clone)]
pub struct FsReportStore {
    root: PathBuf,
    location: String,
}

impl FsReportStore {
    /// Create a store over `root`; the directory is checked on listing
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let location = root.display().to_string();
        Self { root, location }
    }

    /// Create a store over an existing directory
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        store.ensure_root()?;
        Ok(store)
    }

    fn ensure_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(ExError::new(ExErrorKind::NotFound)
                .with_op("open_report_store")
                .with_path(&self.location)
                .with_message("report directory does not exist"))
        }
    }
}

impl ReportStore for FsReportStore {
    fn location(&self) -> &str {
        &self.location
    }

    /// Full paths of the regular files in the root matching `pattern`
    fn list(&self, pattern: &str) -> Result<Vec<String>> {
        self.ensure_root()?;
        compile_pattern(pattern)?;

        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let full = format!("{}/{}", root.trim_end_matches('/'), pattern);

        let entries = glob::glob(&full).map_err(|e| {
            ExError::new(ExErrorKind::InvalidConfig)
                .with_op("list_reports")
                .with_message(format!("invalid report pattern '{}': {}", pattern, e))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                io_error("list_reports", &path, e.into_error())
            })?;
            if !path.is_file() {
                continue;
            }
            match path.to_str() {
                Some(name) => names.push(name.to_string()),
                None => tracing::warn!(
                    op = "list_reports",
                    path = %path.display(),
                    "skipping report with a non UTF-8 path"
                ),
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Value> {
        read_report_file(Path::new(name))
    }
}

/// Read and parse one report file
///
/// # Errors
///
/// Returns `NotFound`/`Io` when the file cannot be read and `InvalidReport`
/// when it is not JSON.
pub fn read_report_file(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| io_error("read_report", path, e))?;
    serde_json::from_str(&text).map_err(|e| {
        ExError::from(DriftError::UnreadableReport {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    })
}
