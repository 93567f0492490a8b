//! Replay command
//!
//! Usage: redline replay <SESSION> [--format clean|tracked|plain] [--at N] [--config FILE]

use clap::{Args, ValueEnum};
use redline_core::ChangeEngine;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    /// All changes accepted, no markup
    #[default]
    Clean,
    /// Changes shown as tracked markup against the original
    Tracked,
    /// Element contents as stored
    Plain,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Session JSON file
    pub session: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Clean)]
    pub format: Format,

    /// Only apply the first N active operations
    #[arg(long)]
    pub at: Option<usize>,

    /// Engine config (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute replay command
pub fn execute(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.config.as_deref())?;
    let mut session = super::load_session(&args.session)?;
    if let Some(at) = args.at {
        session.applied = session.applied.min(at);
    }

    let engine = ChangeEngine::restore(session, config)?;

    let text = match args.format {
        Format::Clean => engine.to_clean_markdown(),
        Format::Tracked => engine.to_tracked_markdown(),
        Format::Plain => engine.to_markdown(),
    };

    super::emit(&text, args.output)
}
