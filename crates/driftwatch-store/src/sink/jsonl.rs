//! JSON-lines results file

use crate::errors::{io_error, Result};
use crate::sink::canonical_json;
use driftwatch_core::findings::Finding;
use driftwatch_core::store::FindingSink;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends each finding as one line to a results file
///
/// Existing content is never truncated, so successive runs accumulate.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    file: File,
}

impl JsonlSink {
    /// Open `path` for appending, creating it and its parent directories
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be created or opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error("open_results", parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| io_error("open_results", &path, e))?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FindingSink for JsonlSink {
    fn append(&mut self, finding: &Finding) -> Result<()> {
        let mut line = canonical_json(finding)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| io_error("append_finding", &self.path, e))
    }
}
