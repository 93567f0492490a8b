//! Persisted editing session
//!
//! A session is the original element snapshot plus the full operation log
//! and its cursor. Current state is never stored; it is re-derived by replay
//! on restore.

use serde::{Deserialize, Serialize};

use crate::errors::{RedlineError, Result};
use crate::model::{Element, Operation};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub version: u32,
    /// Elements as first loaded, before any operation
    pub elements: Vec<Element>,
    /// Every retained operation, including the redo tail
    pub operations: Vec<Operation>,
    /// How many of `operations` are in effect
    pub applied: usize,
}

impl SessionSnapshot {
    /// Snapshot with every operation in effect
    pub fn new(elements: Vec<Element>, operations: Vec<Operation>) -> Self {
        let applied = operations.len();
        Self {
            version: SNAPSHOT_VERSION,
            elements,
            operations,
            applied,
        }
    }

    /// # Errors
    ///
    /// Returns `Serialization` if the JSON does not describe a session.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the header fields before any replay is attempted
    ///
    /// # Errors
    ///
    /// - `Serialization` for an unsupported version
    /// - `CorruptOperationLog` if the cursor runs past the log
    pub fn validate_header(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(RedlineError::Serialization {
                reason: format!("unsupported session version {}", self.version),
            });
        }
        if self.applied > self.operations.len() {
            return Err(RedlineError::CorruptOperationLog {
                index: self.operations.len(),
                reason: format!(
                    "cursor {} exceeds log length {}",
                    self.applied,
                    self.operations.len()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json() {
        let json = r#"{
            "version": 1,
            "elements": [{"id": "p-1", "content": "Hello", "metadata": {"type": "Para"}}],
            "operations": [],
            "applied": 0
        }"#;
        let snapshot = SessionSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.elements.len(), 1);
        assert!(snapshot.validate_header().is_ok());
    }

    #[test]
    fn test_bad_version() {
        let snapshot = SessionSnapshot {
            version: 7,
            ..SessionSnapshot::new(vec![], vec![])
        };
        assert!(matches!(
            snapshot.validate_header(),
            Err(RedlineError::Serialization { .. })
        ));
    }

    #[test]
    fn test_cursor_past_end() {
        let snapshot = SessionSnapshot {
            applied: 2,
            ..SessionSnapshot::new(vec![], vec![])
        };
        assert!(matches!(
            snapshot.validate_header(),
            Err(RedlineError::CorruptOperationLog { .. })
        ));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        assert!(matches!(
            SessionSnapshot::from_json("not json"),
            Err(RedlineError::Serialization { .. })
        ));
    }
}
