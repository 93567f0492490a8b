//! Command inventory for [`crate::engine::ChangeEngine::apply`]
//!
//! Commands are plain data so an editing surface can queue, persist or send
//! them before they are applied.

use redline_core_types::{ElementId, OperationId};
use serde::{Deserialize, Serialize};

use crate::model::{ElementMetadata, InsertPosition};

/// One user action against a [`crate::engine::ChangeEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Replace an element's content, and optionally its metadata
    #[serde(rename_all = "camelCase")]
    Edit {
        element_id: ElementId,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<ElementMetadata>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    /// Insert a new element at a position resolved at apply time
    #[serde(rename_all = "camelCase")]
    Insert {
        content: String,
        #[serde(default)]
        metadata: ElementMetadata,
        position: InsertPosition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Delete {
        element_id: ElementId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Move {
        element_id: ElementId,
        to_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    Undo,

    Redo,

    /// Reset the diff reference for an element
    #[serde(rename_all = "camelCase")]
    SetBaseline { element_id: ElementId, content: String },
}

/// What applying a [`Command`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A new operation was appended to the log
    Recorded {
        operation_id: OperationId,
        element_id: ElementId,
    },
    /// Nothing to record: a ghost edit, a move to the same index, or
    /// undo/redo at the end of history
    Unchanged,
    Undone,
    Redone,
    BaselineSet,
}

impl CommandOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, CommandOutcome::Recorded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_shape() {
        let cmd = Command::Edit {
            element_id: ElementId::from("p-1"),
            content: "Hello".to_string(),
            metadata: None,
            source: None,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["command"], "edit");
        assert_eq!(json["elementId"], "p-1");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_unit_commands_parse() {
        let cmds: Vec<Command> =
            serde_json::from_str(r#"[{"command":"undo"},{"command":"redo"}]"#).unwrap();
        assert_eq!(cmds, vec![Command::Undo, Command::Redo]);
    }

    #[test]
    fn test_insert_defaults_metadata() {
        let cmd: Command = serde_json::from_str(
            r#"{"command":"insert","content":"New","position":{"after":"p-1"}}"#,
        )
        .unwrap();
        match cmd {
            Command::Insert {
                metadata, position, ..
            } => {
                assert_eq!(metadata, ElementMetadata::para());
                assert_eq!(position, InsertPosition::After("p-1".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
