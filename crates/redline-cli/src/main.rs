//! Redline CLI
//!
//! Command-line interface for replaying and resolving tracked changes

use clap::{Parser, Subcommand};
use redline_core::logging_facility::{init, Profile};
use redline_core::markup::StripMode;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "redline")]
#[command(about = "Redline - tracked changes for markdown documents", long_about = None)]
struct Cli {
    /// Log operation boundaries to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a saved session and print the document
    Replay(commands::replay::ReplayArgs),
    /// Summarize the operations in a saved session
    Summary(commands::summary::SummaryArgs),
    /// Print tracked markup between two text files
    Diff(commands::diff::DiffArgs),
    /// Accept every tracked change in a markdown file
    Accept(commands::resolve::ResolveArgs),
    /// Reject every tracked change in a markdown file
    Reject(commands::resolve::ResolveArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Replay(args) => commands::replay::execute(args),
        Commands::Summary(args) => commands::summary::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Accept(args) => commands::resolve::execute(args, StripMode::Accept),
        Commands::Reject(args) => commands::resolve::execute(args, StripMode::Reject),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
