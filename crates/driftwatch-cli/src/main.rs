//! driftwatch CLI
//!
//! Command-line interface for driftwatch

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "driftwatch")]
#[command(about = "driftwatch - Cloud resource configuration audits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare the current scan with the previous one and record findings
    Run(commands::run::RunArgs),
    /// Show the differences between two report files
    Diff(commands::diff::DiffArgs),
    /// Rule file operations
    Rules(commands::rules::RulesArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Rules(args) => commands::rules::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
