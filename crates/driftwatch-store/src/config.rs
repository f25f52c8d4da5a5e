//! Audit configuration
//!
//! ```yaml
//! reports_dir: reports/current
//! previous_reports_dir: reports/previous
//! rules_file: rules.yaml
//! results_file: results/findings.jsonl
//! results_db: results/findings.db      # optional
//! warnings_file: reports/warnings.json # optional
//! log_profile: production              # development (default) | production
//! report_pattern: "*.json"             # default
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use crate::errors::{config_error, io_error, Result};
use driftwatch_core::analytics::REPORT_PATTERN;
use driftwatch_core::logging_facility::Profile;
use driftwatch_core::store::compile_pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Current report generation
    pub reports_dir: PathBuf,
    /// Previous report generation
    pub previous_reports_dir: PathBuf,
    pub rules_file: PathBuf,
    /// JSON-lines results file, appended to
    pub results_file: PathBuf,
    #[serde(default)]
    pub results_db: Option<PathBuf>,
    #[serde(default)]
    pub warnings_file: Option<PathBuf>,
    #[serde(default)]
    pub log_profile: Profile,
    #[serde(default = "default_report_pattern")]
    pub report_pattern: String,
}

fn default_report_pattern() -> String {
    REPORT_PATTERN.to_string()
}

/// Values that take precedence over the config file (command line flags)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub reports_dir: Option<PathBuf>,
    pub previous_reports_dir: Option<PathBuf>,
    pub rules_file: Option<PathBuf>,
    pub results_file: Option<PathBuf>,
    pub results_db: Option<PathBuf>,
    pub warnings_file: Option<PathBuf>,
}

impl AuditConfig {
    /// Configuration with the required paths and every default
    pub fn new(
        reports_dir: impl Into<PathBuf>,
        previous_reports_dir: impl Into<PathBuf>,
        rules_file: impl Into<PathBuf>,
        results_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            previous_reports_dir: previous_reports_dir.into(),
            rules_file: rules_file.into(),
            results_file: results_file.into(),
            results_db: None,
            warnings_file: None,
            log_profile: Profile::default(),
            report_pattern: default_report_pattern(),
        }
    }

    /// Load, resolve and validate a config file
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`Io` when the file cannot be read and
    /// `InvalidConfig` when it does not parse or validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| io_error("load_config", path, e))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_yaml_str(&text, base).map_err(|e| e.with_path(path.display().to_string()))?;
        tracing::debug!(op = "load_config", path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse config text, resolving relative paths against `base`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on syntax errors, unknown keys or failed
    /// validation.
    pub fn from_yaml_str(text: &str, base: &Path) -> Result<Self> {
        let mut config: AuditConfig =
            serde_yaml::from_str(text).map_err(|e| config_error(base, &e.to_string()))?;
        config.resolve_relative_to(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides, then validate again
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the overridden config no longer validates.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        let ConfigOverrides {
            reports_dir,
            previous_reports_dir,
            rules_file,
            results_file,
            results_db,
            warnings_file,
        } = overrides;

        if let Some(v) = reports_dir {
            self.reports_dir = v;
        }
        if let Some(v) = previous_reports_dir {
            self.previous_reports_dir = v;
        }
        if let Some(v) = rules_file {
            self.rules_file = v;
        }
        if let Some(v) = results_file {
            self.results_file = v;
        }
        if results_db.is_some() {
            self.results_db = results_db;
        }
        if warnings_file.is_some() {
            self.warnings_file = warnings_file;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when both generations point at the same
    /// directory or the report pattern is not a valid glob.
    pub fn validate(&self) -> Result<()> {
        if self.reports_dir == self.previous_reports_dir {
            return Err(config_error(
                &self.reports_dir,
                "reports_dir and previous_reports_dir must differ",
            ));
        }
        compile_pattern(&self.report_pattern).map_err(|e| e.with_op("load_config"))?;
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.reports_dir);
        resolve(&mut self.previous_reports_dir);
        resolve(&mut self.rules_file);
        resolve(&mut self.results_file);
        if let Some(p) = self.results_db.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.warnings_file.as_mut() {
            resolve(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_core::errors::ExErrorKind;
    use tempfile::TempDir;

    const MINIMAL: &str = "
reports_dir: current
previous_reports_dir: previous
rules_file: rules.yaml
results_file: out/results.jsonl
";

    #[test]
    fn test_defaults_and_relative_resolution() {
        let config = AuditConfig::from_yaml_str(MINIMAL, Path::new("/srv/audit")).unwrap();
        assert_eq!(config.reports_dir, PathBuf::from("/srv/audit/current"));
        assert_eq!(config.results_file, PathBuf::from("/srv/audit/out/results.jsonl"));
        assert_eq!(config.report_pattern, "*.json");
        assert_eq!(config.log_profile, Profile::Development);
        assert_eq!(config.results_db, None);
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let text = format!("{}results_db: /var/lib/findings.db\nlog_profile: production\n", MINIMAL);
        let config = AuditConfig::from_yaml_str(&text, Path::new("/srv/audit")).unwrap();
        assert_eq!(config.results_db, Some(PathBuf::from("/var/lib/findings.db")));
        assert_eq!(config.log_profile, Profile::Production);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let text = format!("{}colour: blue\n", MINIMAL);
        let err = AuditConfig::from_yaml_str(&text, Path::new(".")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_same_generation_directories_rejected() {
        let text = "
reports_dir: reports
previous_reports_dir: reports
rules_file: rules.yaml
results_file: results.jsonl
";
        let err = AuditConfig::from_yaml_str(text, Path::new("/srv")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = AuditConfig::from_yaml_str(MINIMAL, Path::new("/srv"))
            .unwrap()
            .with_overrides(ConfigOverrides {
                reports_dir: Some(PathBuf::from("/tmp/scan-2")),
                warnings_file: Some(PathBuf::from("/tmp/warnings.json")),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.reports_dir, PathBuf::from("/tmp/scan-2"));
        assert_eq!(config.previous_reports_dir, PathBuf::from("/srv/previous"));
        assert_eq!(config.warnings_file, Some(PathBuf::from("/tmp/warnings.json")));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = AuditConfig::load(&dir.path().join("config.yaml")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_load_resolves_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, MINIMAL).unwrap();
        let config = AuditConfig::load(&path).unwrap();
        assert_eq!(config.rules_file, dir.path().join("rules.yaml"));
    }
}
