//! Engine configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! substitution = "adjacent"        # or "substitution"
//! replacement_threshold = 0.5      # 0 disables whole-text replacement
//! preserve_comments_as_html = true
//! normalize_whitespace = false
//! user_id = "reviewer-1"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffOptions, SubstitutionPolicy};
use crate::errors::{RedlineError, Result};
use crate::markup::StripOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// How a deletion immediately followed by an insertion is written
    pub substitution: SubstitutionPolicy,
    /// Word-overlap ratio below which an edit is shown as one replacement
    pub replacement_threshold: f64,
    /// Keep comments as HTML comments in clean output
    pub preserve_comments_as_html: bool,
    /// Normalize list and quote whitespace before diffing
    ///
    /// Tracked output is then built from the normalised text: accepting it
    /// yields the normalised content, which may differ from the element's
    /// stored content in whitespace only.
    pub normalize_whitespace: bool,
    /// Stamped on every recorded operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let diff = DiffOptions::default();
        Self {
            substitution: diff.substitution,
            replacement_threshold: diff.replacement_threshold,
            preserve_comments_as_html: true,
            normalize_whitespace: diff.normalize_whitespace,
            user_id: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on a parse failure, an unknown key, or an
    /// out-of-range value.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| RedlineError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| RedlineError::InvalidConfig {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if the replacement threshold is not in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let t = self.replacement_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(RedlineError::InvalidConfig {
                reason: format!("replacement_threshold must be within [0, 1], got {}", t),
            });
        }
        Ok(())
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            substitution: self.substitution,
            replacement_threshold: self.replacement_threshold,
            normalize_whitespace: self.normalize_whitespace,
        }
    }

    pub fn strip_options(&self) -> StripOptions {
        StripOptions {
            preserve_comments_as_html: self.preserve_comments_as_html,
        }
    }
}
