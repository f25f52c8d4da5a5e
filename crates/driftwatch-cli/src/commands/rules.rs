//! Rule file commands
//!
//! Usage: driftwatch rules check <PATH>

use clap::{Args, Subcommand};
use driftwatch_core::errors::ExError;
use driftwatch_store::rules_file::load_rule_file;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// Parse a rule file and list its rules and problems
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Path to the rule file
    pub path: PathBuf,
}

pub fn execute(args: RulesArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RulesCommand::Check(check_args) => execute_check(check_args),
    }
}

fn execute_check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rule_file(&args.path)?;

    for rule in &rules.rules {
        let keys: Vec<&str> = rule.predicates.iter().map(|p| p.key.as_str()).collect();
        println!(
            "ok      {} ({} on {}: {})",
            rule.name,
            rule.kind.as_str(),
            rule.violation_resource,
            keys.join(", ")
        );
    }
    for issue in &rules.issues {
        println!("skipped {}", ExError::from(issue.clone()));
    }
    println!(
        "{} rule(s) loaded, {} skipped",
        rules.rules.len(),
        rules.issues.len()
    );
    Ok(())
}
