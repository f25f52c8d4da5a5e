//! Error handling for driftwatch-store
//!
//! Wraps driftwatch-core ExError with store-specific helpers

use driftwatch_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error for a path
///
/// A missing file or directory is classified `NotFound` so callers can
/// tell "nothing there" from "could not read".
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    let kind = match err.kind() {
        std::io::ErrorKind::NotFound => ExErrorKind::NotFound,
        _ => ExErrorKind::Io,
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create a configuration error
pub fn config_error(path: &Path, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("load_config")
        .with_path(path.display().to_string())
        .with_message(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_not_found_kind() {
        let err = io_error(
            "read_report",
            Path::new("/missing"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.path(), Some("/missing"));

        let err = io_error(
            "read_report",
            Path::new("/locked"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert_eq!(err.kind(), ExErrorKind::Io);
    }

    #[test]
    fn test_migration_error_is_persistence() {
        let err = migration_error("001_findings", "syntax error");
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert!(err.message().contains("001_findings"));
    }
}
