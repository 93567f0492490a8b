//! Accept and reject commands
//!
//! Usage: redline accept|reject <FILE> [--output FILE] [--config FILE]

use clap::Args;
use redline_core::markup::{strip_tracked_markup, StripMode};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Markdown file containing tracked markup
    pub file: PathBuf,

    /// Engine config (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute accept or reject
pub fn execute(args: ResolveArgs, mode: StripMode) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.config.as_deref())?;
    let content = std::fs::read_to_string(&args.file)?;

    let resolved = strip_tracked_markup(&content, mode, config.strip_options());

    match args.output {
        Some(path) => {
            std::fs::write(&path, resolved)?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", resolved),
    }
    Ok(())
}
