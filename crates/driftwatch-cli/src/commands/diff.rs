//! Report diff command
//!
//! Usage: driftwatch diff <CURRENT> <PREVIOUS> [--json]

use clap::Args;
use driftwatch_core::diff::render_human_summary;
use driftwatch_engine::commands::compare::compare_reports;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Report from the newer scan
    pub current: PathBuf,

    /// Report from the older scan
    pub previous: PathBuf,

    /// Print the structured diff as JSON instead of the summary
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let diff = compare_reports(&args.current, &args.previous)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print!("{}", render_human_summary(&diff));
    }
    Ok(())
}
