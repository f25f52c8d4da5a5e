//! Audit run command
//!
//! Usage: driftwatch run [--config config.yaml] [--reports DIR] [--previous DIR]
//!        [--rules FILE] [--results FILE] [--db FILE] [--warnings FILE]

use clap::Args;
use driftwatch_core::logging_facility;
use driftwatch_engine::commands::audit::run_audit;
use driftwatch_store::config::{AuditConfig, ConfigOverrides};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Config file (defaults to ./config.yaml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory of the current scan's reports
    #[arg(long)]
    pub reports: Option<PathBuf>,

    /// Directory of the previous scan's reports
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// Rule file (YAML)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// JSON-lines results file, appended to
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// SQLite results database
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// JSON array of warnings from the fetch layer
    #[arg(long)]
    pub warnings: Option<PathBuf>,
}

pub fn execute(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    logging_facility::init(config.log_profile);

    let summary = run_audit(&config)?;

    if summary.failed > 0 {
        eprintln!(
            "Warning: {} of {} findings could not be saved",
            summary.failed, summary.findings_total
        );
    }
    println!("{}", summary.headline());
    Ok(())
}

fn resolve_config(args: RunArgs) -> Result<AuditConfig, Box<dyn std::error::Error>> {
    let overrides = ConfigOverrides {
        reports_dir: args.reports,
        previous_reports_dir: args.previous,
        rules_file: args.rules,
        results_file: args.results,
        results_db: args.db,
        warnings_file: args.warnings,
    };

    let base = match args.config {
        Some(path) => AuditConfig::load(&path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => AuditConfig::load(Path::new(DEFAULT_CONFIG))?,
        None => from_flags(&overrides)?,
    };

    Ok(base.with_overrides(overrides)?)
}

/// Build a config from flags alone when no config file is available
fn from_flags(overrides: &ConfigOverrides) -> Result<AuditConfig, Box<dyn std::error::Error>> {
    match (
        &overrides.reports_dir,
        &overrides.previous_reports_dir,
        &overrides.rules_file,
        &overrides.results_file,
    ) {
        (Some(reports), Some(previous), Some(rules), Some(results)) => Ok(AuditConfig::new(
            reports.clone(),
            previous.clone(),
            rules.clone(),
            results.clone(),
        )),
        _ => Err(format!(
            "no {} found; pass --config, or all of --reports, --previous, --rules and --results",
            DEFAULT_CONFIG
        )
        .into()),
    }
}
