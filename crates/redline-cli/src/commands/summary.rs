//! Summary command
//!
//! Usage: redline summary <SESSION>

use clap::Args;
use redline_core::{ChangeEngine, EngineConfig};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Session JSON file
    pub session: PathBuf,

    /// Print only the one-line summary
    #[arg(long)]
    pub short: bool,
}

/// Execute summary command
pub fn execute(args: SummaryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = super::load_session(&args.session)?;
    let engine = ChangeEngine::restore(session, EngineConfig::default())?;

    println!("{}", engine.summarize_operations());
    if !args.short {
        println!();
        print!("{}", engine.change_report());
    }
    Ok(())
}
