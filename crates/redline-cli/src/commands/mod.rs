pub mod diff;
pub mod replay;
pub mod resolve;
pub mod summary;

use std::path::{Path, PathBuf};

use redline_core::{EngineConfig, SessionSnapshot};

/// Load the engine config, falling back to defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    })
}

pub fn load_session(path: &Path) -> Result<SessionSnapshot, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Ok(SessionSnapshot::from_json(&json)?)
}

/// Write to `output` if given, stdout otherwise
pub fn emit(text: &str, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(&path, text)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}
