//! Diff command
//!
//! Usage: redline diff <OLD> <NEW> [--config FILE]

use clap::Args;
use redline_core::DiffEngine;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Original text file
    pub old: PathBuf,

    /// Modified text file
    pub new: PathBuf,

    /// Engine config (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.config.as_deref())?;
    let old = std::fs::read_to_string(&args.old)?;
    let new = std::fs::read_to_string(&args.new)?;

    let engine = DiffEngine::from_config(&config);
    print!("{}", engine.tracked(&old, &new));
    Ok(())
}
